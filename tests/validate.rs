use sasquatch::testing::ScriptedConfirm;
use sasquatch::validate::{is_affirmative, warning_threshold};
use sasquatch::{validate_processes, ConvertError};

#[test]
fn valid_process_count_is_silent() {
    let confirm = ScriptedConfirm::no();
    validate_processes(2, 8, &confirm).unwrap();
    validate_processes(6, 8, &confirm).unwrap();
    assert_eq!(confirm.times_asked(), 0);
}

#[test]
fn too_many_processes_is_invalid_configuration() {
    let confirm = ScriptedConfirm::yes();
    for available in [1usize, 2, 4, 8, 64] {
        let err = validate_processes(available + 1, available, &confirm).unwrap_err();
        match err {
            ConvertError::InvalidConfiguration { message } => {
                assert!(message.contains(&(available + 1).to_string()));
                assert!(message.contains(&format!("between 2 and {available}")));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }
    assert_eq!(confirm.times_asked(), 0, "the hard cap must not prompt");
}

#[test]
fn zero_processes_is_invalid_configuration() {
    let err = validate_processes(0, 8, &ScriptedConfirm::yes()).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidConfiguration { .. }));
}

#[test]
fn high_utilization_prompts_and_proceeds_on_yes() {
    let confirm = ScriptedConfirm::yes();
    validate_processes(7, 8, &confirm).unwrap();
    validate_processes(8, 8, &confirm).unwrap();
    assert_eq!(confirm.times_asked(), 2);
    assert!(confirm.questions()[0].contains("7 of 8"));
}

#[test]
fn high_utilization_declined_is_user_abort() {
    let err = validate_processes(8, 8, &ScriptedConfirm::no()).unwrap_err();
    assert!(err.is_user_abort());
    assert!(matches!(err, ConvertError::UserAborted { requested: 8 }));
}

#[test]
fn closures_can_confirm() {
    validate_processes(4, 4, &|_: &str| true).unwrap();
    assert!(validate_processes(4, 4, &|_: &str| false).is_err());
}

#[test]
fn threshold_is_three_quarters_rounded_down() {
    assert_eq!(warning_threshold(8), 6);
    assert_eq!(warning_threshold(16), 12);
    assert_eq!(warning_threshold(6), 4);
    assert_eq!(warning_threshold(2), 1);
    assert_eq!(warning_threshold(1), 1);
    assert_eq!(warning_threshold(0), 1);
}

#[test]
fn single_worker_never_prompts() {
    let confirm = ScriptedConfirm::no();
    validate_processes(1, 1, &confirm).unwrap();
    validate_processes(1, 2, &confirm).unwrap();
    assert_eq!(confirm.times_asked(), 0);

    // Two of two cores is still high utilization.
    let err = validate_processes(2, 2, &confirm).unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(confirm.times_asked(), 1);
}

#[test]
fn affirmative_answers() {
    for yes in ["y", "Y", "yes", "YES", " yes\n", "Yes\r\n"] {
        assert!(is_affirmative(yes), "{yes:?}");
    }
    for no in ["", "n", "no", "yep", "y e s", "\n"] {
        assert!(!is_affirmative(no), "{no:?}");
    }
}
