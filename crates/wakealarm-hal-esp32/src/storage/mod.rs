pub mod retained;
