//! Synthetic payload and schema-text generation.

use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random alphanumeric string with a space at every eighth position, so the
/// term index has word boundaries to chew on.
pub fn random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|i| {
            if i % 8 == 0 {
                ' '
            } else {
                CHARSET[rng.random_range(0..CHARSET.len())] as char
            }
        })
        .collect()
}

/// One random character repeated `length` times. Highly compressible, as a
/// counterpoint to [`random_string`].
pub fn less_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    let c = CHARSET[rng.random_range(0..CHARSET.len())] as char;
    String::from(c).repeat(length)
}

/// Schema text for `node_type_count` node types with `pred_count` scalar
/// predicates each: per-type blocks with a name field, the predicate
/// fields, an ordered-chain `NEXT` edge, and one `LINKk` edge per node type,
/// followed by the index directives.
pub fn schema_text(node_type_count: usize, pred_count: usize) -> String {
    let mut schema = String::new();
    for i in 0..node_type_count {
        schema.push_str(&format!("type Node{i} {{\n"));
        schema.push_str("\tname\n");
        for j in 0..pred_count {
            schema.push_str(&format!("\tpred{j}\n"));
        }
        schema.push_str("\tNEXT\n");
        for k in 0..node_type_count {
            schema.push_str(&format!("\tLINK{k}\n"));
        }
        schema.push_str("}\n\n");
    }
    schema.push_str("name: string @index(term) .\n");
    for j in 0..pred_count {
        schema.push_str(&format!("pred{j}: string @index(hash) .\n"));
    }
    schema.push_str("NEXT: [uid] .\n");
    for k in 0..node_type_count {
        schema.push_str(&format!("LINK{k}: [uid] .\n"));
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_string_places_spaces_every_eighth_char() {
        let s = random_string(20);
        assert_eq!(s.len(), 20);
        for (i, c) in s.chars().enumerate() {
            if i % 8 == 0 {
                assert_eq!(c, ' ', "index {i} of {s:?}");
            } else {
                assert!(c.is_ascii_alphanumeric(), "index {i} of {s:?}");
            }
        }
    }

    #[test]
    fn less_random_string_repeats_one_char() {
        let s = less_random_string(12);
        assert_eq!(s.len(), 12);
        let first = s.chars().next().unwrap();
        assert!(s.chars().all(|c| c == first));
        assert!(first.is_ascii_alphanumeric());
    }

    #[test]
    fn zero_length_strings() {
        assert_eq!(random_string(0), "");
        assert_eq!(less_random_string(0), "");
    }

    #[test]
    fn schema_text_golden_shape() {
        let schema = schema_text(2, 2);
        let expected = "\
type Node0 {
\tname
\tpred0
\tpred1
\tNEXT
\tLINK0
\tLINK1
}

type Node1 {
\tname
\tpred0
\tpred1
\tNEXT
\tLINK0
\tLINK1
}

name: string @index(term) .
pred0: string @index(hash) .
pred1: string @index(hash) .
NEXT: [uid] .
LINK0: [uid] .
LINK1: [uid] .
";
        assert_eq!(schema, expected);
    }
}
