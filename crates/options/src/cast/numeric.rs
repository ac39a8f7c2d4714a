//! Numeric-string recognition shared by the integer and number casters.

use serde_json::{Number, Value};

/// Parses `s` if the whole string (ignoring surrounding whitespace) is a
/// decimal number, yielding an integer for in-range integer literals and a
/// float otherwise.
pub(crate) fn parse(s: &str) -> Option<Value> {
	let text = s.trim();
	let len = scan(text);
	if len == 0 || len != text.len() {
		return None;
	}
	to_number(text)
}

/// Value of the longest numeric prefix of `s`, or `None` when it has none.
pub(crate) fn leading(s: &str) -> Option<Value> {
	let text = s.trim_start();
	let len = scan(text);
	if len == 0 {
		return None;
	}
	to_number(&text[..len])
}

fn to_number(text: &str) -> Option<Value> {
	if !text.contains(['.', 'e', 'E'])
		&& let Ok(int) = text.parse::<i64>()
	{
		return Some(Value::from(int));
	}
	let float = text.parse::<f64>().ok()?;
	Number::from_f64(float).map(Value::Number)
}

/// Length in bytes of the numeric literal at the start of `s`: optional sign,
/// digits with an optional fraction, then an optional exponent.
fn scan(s: &str) -> usize {
	let b = s.as_bytes();
	let digits_from = |mut i: usize| {
		while i < b.len() && b[i].is_ascii_digit() {
			i += 1;
		}
		i
	};

	let mut i = usize::from(matches!(b.first(), Some(b'+' | b'-')));
	let int_end = digits_from(i);
	let mut digits = int_end - i;
	i = int_end;

	if b.get(i) == Some(&b'.') {
		let frac_end = digits_from(i + 1);
		if digits > 0 || frac_end > i + 1 {
			digits += frac_end - (i + 1);
			i = frac_end;
		}
	}
	if digits == 0 {
		return 0;
	}

	if matches!(b.get(i), Some(b'e' | b'E')) {
		let mut j = i + 1;
		if matches!(b.get(j), Some(b'+' | b'-')) {
			j += 1;
		}
		let exp_end = digits_from(j);
		if exp_end > j {
			i = exp_end;
		}
	}
	i
}
