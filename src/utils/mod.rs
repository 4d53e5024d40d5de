pub mod approach;
