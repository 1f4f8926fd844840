pub mod crossword;
pub mod word;
