//! Property tests over value ranges

use proptest::prelude::*;
use trislot_core::{composite, Record, Shape};

#[derive(Debug, Default, Clone, PartialEq)]
#[repr(C)]
struct Pair {
    key: u32,
    value: i64,
}
composite!(Pair);

#[derive(Debug, Default, Clone, PartialEq)]
struct Wide {
    values: [u64; 4],
}
composite!(Wide);

proptest! {
    #[test]
    fn prop_integers_round_trip(a in any::<u64>(), b in any::<i128>(), c in any::<i8>()) {
        prop_assert_eq!(Record::ok(a).unwrap(), a);
        prop_assert_eq!(Record::ok(b).unwrap(), b);
        prop_assert_eq!(Record::ok(c).unwrap(), c);
    }

    #[test]
    fn prop_floats_keep_bits(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        prop_assert_eq!(Record::ok(value).unwrap().to_bits(), bits);
    }

    #[test]
    fn prop_chars_round_trip(value in any::<char>()) {
        prop_assert_eq!(Record::ok(value).unwrap(), value);
    }

    #[test]
    fn prop_text_round_trips(text in ".*") {
        prop_assert_eq!(Record::ok(text.as_str()).unwrap(), text.as_str());
        prop_assert_eq!(Record::ok(text.clone()).unwrap(), text);
    }

    #[test]
    fn prop_buffers_keep_length_and_capacity(
        values in prop::collection::vec(any::<u16>(), 0..64),
        spare in 0usize..64,
    ) {
        let mut buffer = Vec::with_capacity(values.len() + spare);
        buffer.extend_from_slice(&values);
        let capacity = buffer.capacity();
        let back = Record::ok(buffer).unwrap();
        prop_assert_eq!(back.capacity(), capacity);
        prop_assert_eq!(back, values);
    }

    #[test]
    fn prop_composites_round_trip(key in any::<u32>(), value in any::<i64>(), values in any::<[u64; 4]>()) {
        let pair = Pair { key, value };
        let record = Record::ok(pair.clone());
        prop_assert_eq!(record.shape(), Some(Shape::InlineScalar));
        prop_assert_eq!(record.unwrap(), pair);

        let wide = Wide { values };
        let record = Record::ok(wide.clone());
        prop_assert_eq!(record.shape(), Some(Shape::Allocated));
        prop_assert_eq!(record.unwrap(), wide);
    }

    #[test]
    fn prop_error_messages_survive(message in "[a-z ]{0,32}") {
        let error = std::io::Error::other(message.clone());
        let back = Record::<u64>::err(error).unwrap_err();
        prop_assert_eq!(back.to_string(), message);
    }
}
