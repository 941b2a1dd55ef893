mod repository;
mod tree;
