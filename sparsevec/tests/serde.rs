#![allow(missing_docs)]
#![cfg(feature = "serde")]

use serde_test::{assert_de_tokens, assert_de_tokens_error, assert_tokens, Token};
use sparsevec::{sparse_vec, SparseVec};

#[test]
fn map_in_index_order() {
    let v = sparse_vec![8u32 => 'c', 0 => 'a', 5 => 'b'];
    assert_tokens(
        &v,
        &[
            Token::Map { len: Some(3) },
            Token::U32(0),
            Token::Char('a'),
            Token::U32(5),
            Token::Char('b'),
            Token::U32(8),
            Token::Char('c'),
            Token::MapEnd,
        ],
    );
    let empty = SparseVec::<char, u32>::new();
    assert_tokens(&empty, &[Token::Map { len: Some(0) }, Token::MapEnd]);
}

#[test]
fn unordered_input() {
    let expected = sparse_vec![3u8 => 30i32, 1 => 10];
    assert_de_tokens(
        &expected,
        &[
            Token::Map { len: None },
            Token::U8(3),
            Token::I32(30),
            Token::U8(1),
            Token::I32(10),
            Token::MapEnd,
        ],
    );
}

#[test]
fn duplicate_index_is_an_error() {
    assert_de_tokens_error::<SparseVec<i32, u8>>(
        &[
            Token::Map { len: Some(2) },
            Token::U8(1),
            Token::I32(10),
            Token::U8(1),
            Token::I32(20),
        ],
        "A value already exists at index 1",
    );
}

#[test]
fn reserved_index_is_an_error() {
    assert_de_tokens_error::<SparseVec<i32, u8>>(
        &[Token::Map { len: Some(1) }, Token::U8(255), Token::I32(1)],
        "Index 255 is reserved and can never hold a value",
    );
}
