/// Parser for whitespace-separated 4x4 transformation strings
use std::borrow::Cow;

use nalgebra::Matrix4;
use nom::{combinator::all_consuming, number::complete::float, IResult};

use crate::error::MatrixFormatError;

/// Number of values in a serialized 4x4 matrix
pub const MATRIX_LEN: usize = 16;

/// Parse a transformation string into a matrix, filling rows in order
pub fn parse_matrix(text: &str) -> Result<Matrix4<f32>, MatrixFormatError> {
    let values = parse_values(text)?;
    Ok(Matrix4::from_row_slice(&values))
}

/// Parse a transformation string into its 16 values, in input order.
///
/// Tolerates exporter output such as `.5` and `5.`.
pub fn parse_values(text: &str) -> Result<Vec<f32>, MatrixFormatError> {
    let values = text
        .split_whitespace()
        .map(|token| {
            parse_token(token).ok_or_else(|| MatrixFormatError::InvalidToken {
                text: text.to_string(),
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if values.len() != MATRIX_LEN {
        return Err(MatrixFormatError::WrongCount {
            text: text.to_string(),
            found: values.len(),
        });
    }

    Ok(values)
}

fn parse_token(token: &str) -> Option<f32> {
    let token = normalize_token(token);
    number(&token).ok().map(|(_, value)| value)
}

fn number(input: &str) -> IResult<&str, f32> {
    all_consuming(float)(input)
}

/// Pad a bare leading or trailing decimal point with a zero
fn normalize_token(token: &str) -> Cow<'_, str> {
    let sign_len = usize::from(token.starts_with(['-', '+']));
    let (sign, body) = token.split_at(sign_len);

    if body.len() < 2 {
        return Cow::Borrowed(token);
    }

    if body.starts_with('.') {
        Cow::Owned(format!("{sign}0{body}"))
    } else if body.ends_with('.') {
        Cow::Owned(format!("{token}0"))
    } else {
        Cow::Borrowed(token)
    }
}
