pub mod cached;
