use proptest::prelude::*;
use protolink::interop::CallOutcome;
use protolink::proto::{self, CallStatus, Error, Greetings, PersonParams, Response};
use protolink::{CallError, FailureKind};

proptest! {
    #[test]
    fn greetings_survive_the_wire(name in ".{0,64}", language in any::<i32>()) {
        let message = Greetings { name, language };
        let decoded: Greetings = proto::decode(&proto::encode(&message)).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn person_params_survive_the_wire(name in "\\PC{0,32}", age in any::<u32>()) {
        let message = PersonParams { name, age };
        let decoded: PersonParams = proto::decode(&proto::encode(&message)).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn responses_and_errors_survive_the_wire(text in ".{0,128}") {
        let response = Response { text: text.clone() };
        prop_assert_eq!(proto::decode::<Response>(&proto::encode(&response)).unwrap(), response);

        let error = Error { details: text };
        prop_assert_eq!(proto::decode::<Error>(&proto::encode(&error)).unwrap(), error);
    }

    #[test]
    fn negative_status_is_always_a_decode_failure(
        status in i32::MIN..0,
        payload in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let err = CallOutcome::from_status(status, payload).into_result().unwrap_err();
        prop_assert_eq!(err, CallError::DecodeFailure { code: status });
    }

    #[test]
    fn unmapped_status_keeps_code_and_details(status in 6..i32::MAX, details in "[a-z ]{1,40}") {
        let payload = proto::encode(&Error { details: details.clone() });
        let err = CallOutcome::from_status(status, payload).into_result().unwrap_err();
        prop_assert_eq!(err, CallError::UnknownFailure { code: status, details });
    }

    #[test]
    fn success_passes_payload_through(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
        let bytes = CallOutcome::from_status(0, payload.clone()).into_result().unwrap();
        prop_assert_eq!(bytes, payload);
    }
}

#[test]
fn test_mapped_statuses() {
    let kind = |status: CallStatus| {
        CallOutcome::from_status(status.code(), Vec::new())
            .into_result()
            .unwrap_err()
            .kind()
    };
    assert_eq!(kind(CallStatus::DecodeError), FailureKind::Decode);
    assert_eq!(kind(CallStatus::InvalidArguments), FailureKind::Validation);
    assert_eq!(kind(CallStatus::InvalidArgumentsDetails), FailureKind::Validation);
    assert_eq!(kind(CallStatus::UnknownEnumValue), FailureKind::EnumDomain);
    assert_eq!(kind(CallStatus::EmptyParams), FailureKind::MissingRequiredField);
    assert_eq!(kind(CallStatus::InternalError), FailureKind::Unknown);
}
