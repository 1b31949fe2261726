//! Record round trips and fixed-size guarantees

use std::fmt;
use std::mem::size_of;
use std::rc::Rc;
use std::sync::Arc;

use trislot_core::{composite, Dynamic, Failure, Payload, Record, Shape, Variant};

const THREE_WORDS: usize = 3 * size_of::<usize>();

#[derive(Debug, PartialEq)]
struct NotFound(&'static str);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found", self.0)
    }
}

impl std::error::Error for NotFound {}

#[derive(Debug, Default, Clone, PartialEq)]
struct Triple(u64, u64, u64);
composite!(Triple);

#[test]
fn test_size_invariant() {
    assert_eq!(size_of::<Record<bool>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<char>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<u8>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<i16>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<u32>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<i64>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<u128>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<isize>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<f32>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<f64>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<&str>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<String>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<Vec<u64>>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<*const u8>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<Option<Box<u8>>>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<Dynamic>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<Option<Failure>>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<Triple>>(), THREE_WORDS);
    assert_eq!(size_of::<Record<[u8; 1024]>>(), THREE_WORDS);
}

#[test]
fn test_scalar_round_trips() {
    assert!(Record::ok(true).unwrap());
    assert_eq!(Record::ok('λ').unwrap(), 'λ');
    assert_eq!(Record::ok(u8::MAX).unwrap(), u8::MAX);
    assert_eq!(Record::ok(i64::MIN).unwrap(), i64::MIN);
    assert_eq!(Record::ok(u128::MAX - 1).unwrap(), u128::MAX - 1);
    assert_eq!(Record::ok(-1i128).unwrap(), -1);
    assert_eq!(Record::ok(1.5f32).unwrap(), 1.5);
    assert!(Record::ok(f64::NAN).unwrap().is_nan());
    Record::ok(()).unwrap();
}

#[test]
fn test_text_round_trips() {
    let owned = String::from("hello, world");
    let record = Record::ok(owned.as_str());
    assert_eq!(record.shape(), Some(Shape::Text));
    assert_eq!(record.unwrap(), "hello, world");

    let numbers = [3u16, 1, 4, 1, 5];
    assert_eq!(Record::ok(&numbers[1..]).unwrap(), &[1, 4, 1, 5]);

    let boxed: Box<str> = "boxed".into();
    assert_eq!(&*Record::ok(boxed).unwrap(), "boxed");

    let slice: Box<[u32]> = vec![7, 8, 9].into_boxed_slice();
    assert_eq!(&*Record::ok(slice).unwrap(), &[7, 8, 9]);
}

#[test]
fn test_buffer_keeps_length_and_capacity() {
    let mut buffer = Vec::with_capacity(45);
    buffer.push(1u64);
    let back = Record::ok(buffer).unwrap();
    assert_eq!(back, vec![1]);
    assert_eq!(back.len(), 1);
    assert_eq!(back.capacity(), 45);

    let mut text = String::with_capacity(32);
    text.push_str("abc");
    let back = Record::ok(text).unwrap();
    assert_eq!(back, "abc");
    assert_eq!(back.capacity(), 32);
}

#[test]
fn test_empty_buffers() {
    let record = Record::ok(Vec::<u8>::new());
    assert!(record.is_ok());
    assert_eq!(record.shape(), Some(Shape::Buffer));
    assert!(record.unwrap().is_empty());

    let units = Record::ok(vec![(); 5]).unwrap();
    assert_eq!(units.len(), 5);
}

#[test]
fn test_zero_sized_elements_drop_once() {
    use std::cell::Cell;

    thread_local! {
        static DROPS: Cell<usize> = const { Cell::new(0) };
    }

    struct Marker;

    impl Drop for Marker {
        fn drop(&mut self) {
            DROPS.with(|drops| drops.set(drops.get() + 1));
        }
    }

    let markers: Vec<Marker> = (0..4).map(|_| Marker).collect();
    let record = Record::ok(markers);
    assert_eq!(record.shape(), Some(Shape::Buffer));

    let copy = Record::ok(vec![(); 7]).clone().unwrap();
    assert_eq!(copy.len(), 7);

    let mut markers = record.unwrap();
    assert_eq!(markers.len(), 4);
    markers.push(Marker);
    drop(markers);
    assert_eq!(DROPS.with(Cell::get), 5);
}

#[test]
#[should_panic(expected = "too long")]
fn test_overlong_zero_sized_buffer() {
    let mut units = Vec::<()>::new();
    // SAFETY: `()` needs no initialization.
    unsafe { units.set_len(1usize << (usize::BITS - 1)) };
    let _ = Record::ok(units);
}

#[test]
fn test_pointer_round_trips() {
    let value = 42u32;
    let ptr: *const u32 = &value;
    assert_eq!(Record::ok(ptr).unwrap(), ptr);
    assert!(Record::ok(std::ptr::null_mut::<u8>()).unwrap().is_null());

    assert_eq!(Record::ok(Some(&value)).unwrap(), Some(&42));
    assert_eq!(Record::ok(Some(Box::new(9u8))).unwrap(), Some(Box::new(9)));
    assert_eq!(Record::<Option<Box<u8>>>::ok(None).unwrap(), None);

    let shared = Arc::new(String::from("arc"));
    let back = Record::ok(Some(Arc::clone(&shared))).unwrap();
    assert!(back.is_some_and(|back| Arc::ptr_eq(&back, &shared)));
    assert_eq!(Arc::strong_count(&shared), 1);

    let local = Rc::new(5i32);
    let back = Record::ok(Some(Rc::clone(&local))).unwrap();
    assert_eq!(back.as_deref(), Some(&5));

    fn square(x: i32) -> i32 {
        x * x
    }
    let f: Option<fn(i32) -> i32> = Some(square);
    assert_eq!(Record::ok(f).unwrap().map(|f| f(7)), Some(49));
}

#[test]
fn test_allocated_round_trips() {
    let record = Record::ok(Triple(1, 2, 3));
    assert_eq!(record.shape(), Some(Shape::Allocated));
    assert_eq!(record.unwrap(), Triple(1, 2, 3));

    let mut bytes = [0u8; 100];
    bytes[99] = 0xff;
    assert_eq!(Record::ok(bytes).unwrap()[99], 0xff);
}

#[test]
fn test_zero_record() {
    assert!(Record::<u64>::default().is_ok());
    assert_eq!(Record::<u64>::default().unwrap(), 0);
    assert!(!Record::<bool>::default().unwrap());
    assert_eq!(Record::<&str>::default().unwrap(), "");
    assert!(Record::<String>::default().unwrap().is_empty());
    assert!(Record::<Vec<i8>>::default().unwrap().is_empty());
    assert!(Record::<*const u8>::default().unwrap().is_null());
    assert!(Record::<Dynamic>::default().unwrap().is_nil());
    assert!(Record::<Option<Failure>>::default().unwrap().is_none());
    assert_eq!(Record::<Triple>::default().unwrap(), Triple::default());
    assert_eq!(Record::<[u8; 4]>::default().unwrap(), [0; 4]);
}

#[test]
fn test_zero_encodings_agree() {
    let explicit = Record::<String>::zero();
    let implicit = Record::<String>::default();
    assert_eq!(explicit.validate(), Ok(Variant::Ok(Shape::Buffer)));
    assert_eq!(implicit.validate(), Ok(Variant::Zero));
    assert_eq!(explicit.unwrap(), implicit.unwrap());
}

#[test]
fn test_absent_error_normalizes_to_success() {
    let record = Record::<u32>::from_failure(None::<Failure>);
    assert!(record.is_ok());
    assert_eq!(record.unwrap(), 0);

    let record = Record::<String>::from_failure(None::<NotFound>);
    assert!(record.unwrap().is_empty());

    let record = Record::from_pair(8u8, None::<Failure>);
    assert_eq!(record.unwrap(), 8);
}

#[test]
fn test_error_fidelity() {
    let failure = Failure::new(NotFound("key"));
    let record = Record::<u64>::err(failure.clone());
    assert!(record.is_err());
    let back = record.unwrap_err();
    assert!(Failure::ptr_eq(&back, &failure));
    assert_eq!(back.downcast_ref::<NotFound>(), Some(&NotFound("key")));
    assert_eq!(back.to_string(), "key not found");

    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(NotFound("boxed"));
    let back = Record::<&str>::err(Failure::from_boxed(boxed)).unwrap_err();
    assert_eq!(back.downcast_ref::<NotFound>(), Some(&NotFound("boxed")));

    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    let back = Record::<Vec<u8>>::err(io).unwrap_err();
    assert_eq!(
        back.downcast_ref::<std::io::Error>().map(|e| e.kind()),
        Some(std::io::ErrorKind::Other)
    );
}

#[test]
fn test_error_for_every_shape() {
    fn check<T: Payload>() {
        let failure = Failure::new(NotFound("any"));
        let record = Record::<T>::err(failure.clone());
        assert_eq!(record.validate(), Ok(Variant::Err));
        assert!(Failure::ptr_eq(&record.unwrap_err(), &failure));
    }

    check::<u8>();
    check::<u128>();
    check::<*const u8>();
    check::<&str>();
    check::<String>();
    check::<Dynamic>();
    check::<Option<Failure>>();
    check::<Triple>();
}

#[test]
fn test_pair_accessors() {
    let (value, failure) = Record::<u16>::err(NotFound("pair")).into_pair();
    assert_eq!(value, 0);
    assert!(failure.is_some_and(|f| f.is::<NotFound>()));

    let (value, ok) = Record::ok(String::from("v")).into_pair_with_flag();
    assert_eq!((value.as_str(), ok), ("v", true));

    assert_eq!(Record::<i8>::err(NotFound("x")).unwrap_or(-1), -1);
    assert_eq!(Record::ok(4i8).unwrap_or(-1), 4);
    assert_eq!(
        Record::<String>::err(NotFound("y")).unwrap_or_else(|f| f.to_string()),
        "y not found"
    );
    assert_eq!(Record::<u8>::err(NotFound("z")).unwrap_or_zero(), 0);
    assert_eq!(Record::ok(3u8).into_value(), Some(3));
    assert!(Record::ok(3u8).into_failure().is_none());
}

#[test]
fn test_result_conversions() {
    let record: Record<u32> = Ok::<u32, NotFound>(7).into();
    assert_eq!(record.unwrap(), 7);

    let record: Record<u32> = Err(NotFound("conv")).into();
    let result: Result<u32, Failure> = record.into();
    assert!(result.is_err_and(|f| f.is::<NotFound>()));
}

#[test]
fn test_clone_records() {
    let record = Record::ok(Triple(4, 5, 6));
    let copy = record.clone();
    assert_eq!(record.unwrap(), copy.unwrap());

    let record = Record::ok(vec![String::from("a"), String::from("b")]);
    assert_eq!(record.clone().unwrap(), record.unwrap());

    let record = Record::<Triple>::default();
    assert_eq!(record.clone().validate(), Ok(Variant::Zero));
}

#[test]
fn test_drop_releases_payload() {
    let shared = Arc::new(1u8);
    let record = Record::ok(Some(Arc::clone(&shared)));
    assert_eq!(Arc::strong_count(&shared), 2);
    drop(record);
    assert_eq!(Arc::strong_count(&shared), 1);

    let shared_error = Arc::new(NotFound("drop"));
    let record = Record::<u8>::err(Failure::from_arc(Arc::clone(&shared_error)));
    assert_eq!(Arc::strong_count(&shared_error), 2);
    drop(record);
    assert_eq!(Arc::strong_count(&shared_error), 1);
}

#[test]
fn test_send_across_threads() {
    let record = Record::ok(String::from("sent"));
    let back = std::thread::spawn(move || record.unwrap()).join().unwrap();
    assert_eq!(back, "sent");
}

#[test]
fn test_debug_and_display() {
    assert_eq!(format!("{:?}", Record::ok(1u8)), "Ok(1)");
    assert_eq!(
        format!("{:?}", Record::<u8>::err(NotFound("dbg"))),
        "Err(NotFound(\"dbg\"))"
    );
    assert_eq!(Record::ok(2.5f64).to_string(), "Ok(2.5)");
    assert_eq!(
        Record::<f64>::err(NotFound("disp")).to_string(),
        "Err(disp not found)"
    );
}

#[test]
#[should_panic(expected = "called `Record::unwrap()` on an `Err` value: key not found")]
fn test_unwrap_err_record_panics() {
    Record::<String>::err(NotFound("key")).unwrap();
}

#[test]
#[should_panic(expected = "called `Record::unwrap_err()` on an `Ok` value")]
fn test_unwrap_err_on_success_panics() {
    Record::ok(String::from("fine")).unwrap_err();
}

#[test]
#[should_panic(expected = "called `Record::unwrap_err()` on an `Ok` value")]
fn test_unwrap_err_on_zero_panics() {
    Record::<u8>::default().unwrap_err();
}
