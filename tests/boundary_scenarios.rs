//! End-to-end calls through the in-process exports

use protolink::ffi::{free_buffer, is_live_person, rust_protos_greet};
use protolink::interop::{func_args_result, CallOutcome, OutSlots};
use protolink::proto::{CallStatus, Greetings, Response};
use protolink::{greet, greet_in, CallError, FailureKind, Language, LibraryError, NativeLibrary, Person};
use std::sync::Arc;
use std::thread;

fn library() -> Arc<NativeLibrary> {
    NativeLibrary::in_process().shared()
}

/// Wire-compatible with `Greetings` except that field 2 is length-delimited
#[derive(Clone, PartialEq, prost::Message)]
struct MistypedGreetings {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(string, tag = "2")]
    language: String,
}

#[test]
fn test_greet_english() {
    let library = library();
    assert_eq!(greet(&library, "Mike").unwrap(), "Hello, Mike");
}

#[test]
fn test_greet_languages() {
    let library = library();
    assert_eq!(greet_in(&library, "Mike", Language::Spanish).unwrap(), "Hola, Mike");
    assert_eq!(greet_in(&library, "Mike", Language::French).unwrap(), "Bonjour, Mike");
}

#[test]
fn test_empty_name_is_missing_field() {
    let library = library();
    let err = greet(&library, "").unwrap_err();
    assert_eq!(err, CallError::MissingRequiredField);
    assert!(err.is_caller_error());
}

#[test]
fn test_unknown_language() {
    let library = library();
    let request = Greetings {
        name: "Mike".to_string(),
        language: 7,
    };
    let err = func_args_result::<_, Response>(&library, "greet", library.symbols().greet, &request)
        .unwrap_err();
    assert_eq!(err, CallError::EnumDomainFailure);
}

#[test]
fn test_long_name_carries_details() {
    let library = library();
    let name = "x".repeat(300);
    let err = greet(&library, &name).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Validation);
    let details = err.details().unwrap();
    assert!(details.contains("256"), "{}", details);
    assert!(details.contains("300"), "{}", details);
}

#[test]
fn test_person_lifecycle() {
    let library = library();
    let person = Person::new(&library, "Alice", 30).unwrap();
    let handle = person.instance().raw_handle().unwrap();
    assert!(is_live_person(handle));

    assert_eq!(person.greet("Mike").unwrap(), "Hello, Mike");
    assert_eq!(person.greet_in("Mike", Language::French).unwrap(), "Bonjour, Mike");

    person.instance().release().unwrap();
    assert!(!is_live_person(handle));

    assert_eq!(
        person.instance().release(),
        Err(CallError::Released("Person"))
    );
    assert_eq!(person.greet("Mike"), Err(CallError::Released("Person")));
}

#[test]
fn test_person_dispose_and_drop() {
    let library = library();

    let disposed = Person::new(&library, "Alice", 30).unwrap();
    let disposed_handle = disposed.instance().raw_handle().unwrap();
    disposed.dispose().unwrap();
    assert!(!is_live_person(disposed_handle));

    let dropped = Person::new(&library, "Bob", 41).unwrap();
    let dropped_handle = dropped.instance().raw_handle().unwrap();
    drop(dropped);
    assert!(!is_live_person(dropped_handle));
}

#[test]
fn test_person_rejected_at_construction() {
    let library = library();
    assert_eq!(
        Person::new(&library, "", 30).unwrap_err(),
        CallError::MissingRequiredField
    );
    assert_eq!(
        Person::new(&library, "Alice", 200).unwrap_err(),
        CallError::ValidationFailure { details: None }
    );
}

#[test]
fn test_corrupted_request_bytes() {
    let symbols = *library().symbols();
    // field 1, length 0x7f, but only one byte follows
    let corrupted = [0x0a_u8, 0x7f, b'M'];
    let mut slots = OutSlots::new();

    let status = unsafe {
        (symbols.greet)(
            corrupted.as_ptr(),
            corrupted.len() as u64,
            slots.ptr_slot(),
            slots.len_slot(),
        )
    };
    assert_eq!(status, CallStatus::DecodeError.code());
    assert!(status < 0);

    let payload = if slots.ptr == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(slots.ptr as *const u8, slots.len as usize).to_vec() }
    };
    unsafe { free_buffer(slots.ptr, slots.len) };

    let err = CallOutcome::from_status(status, payload).into_result().unwrap_err();
    assert_eq!(err, CallError::DecodeFailure { code: status });
    assert_eq!(err.details(), None);
}

#[test]
fn test_mistyped_request_through_adapter() {
    let library = library();
    let request = MistypedGreetings {
        name: "Mike".to_string(),
        language: "French".to_string(),
    };
    let err = func_args_result::<_, Response>(&library, "greet", rust_protos_greet, &request)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Decode);
    assert!(!err.is_caller_error());
}

#[test]
fn test_close_waits_for_instances() {
    let library = library();
    let person = Person::new(&library, "Alice", 30).unwrap();

    let err = NativeLibrary::close(Arc::clone(&library)).unwrap_err();
    assert!(matches!(err, LibraryError::InUse { refs: 1 }));

    person.dispose().unwrap();
    NativeLibrary::close(library).unwrap();
}

#[test]
fn test_concurrent_calls() {
    let library = library();
    let person = Arc::new(Person::new(&library, "Alice", 30).unwrap());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let library = Arc::clone(&library);
            let person = Arc::clone(&person);
            thread::spawn(move || {
                for j in 0..50 {
                    let name = format!("caller-{}-{}", i, j);
                    assert_eq!(greet(&library, &name).unwrap(), format!("Hello, {}", name));
                    assert_eq!(person.greet(&name).unwrap(), format!("Hello, {}", name));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(person.is_live());
}

#[test]
fn test_release_races_with_calls() {
    let library = library();
    let person = Arc::new(Person::new(&library, "Alice", 30).unwrap());
    let handle = person.instance().raw_handle().unwrap();

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let person = Arc::clone(&person);
            thread::spawn(move || {
                for _ in 0..100 {
                    match person.greet("Mike") {
                        Ok(text) => assert_eq!(text, "Hello, Mike"),
                        Err(err) => assert_eq!(err, CallError::Released("Person")),
                    }
                }
            })
        })
        .collect();

    let releasers: Vec<_> = (0..4)
        .map(|_| {
            let person = Arc::clone(&person);
            thread::spawn(move || person.instance().release().is_ok())
        })
        .collect();

    let released: usize = releasers
        .into_iter()
        .map(|r| usize::from(r.join().unwrap()))
        .sum();
    for caller in callers {
        caller.join().unwrap();
    }

    assert_eq!(released, 1);
    assert!(!is_live_person(handle));
}
