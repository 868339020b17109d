pub mod index_books;

pub use index_books::index_books;
