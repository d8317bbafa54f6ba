// tests/security_policy.rs

use proptest::prelude::*;

use shellrunner::errors::ShellrunnerError;
use shellrunner::security::{DENY_LIST, MAX_COMMAND_LEN, first_violation, validate};

#[test]
fn sudo_rm_reports_the_earlier_declared_pattern() {
    let rm = DENY_LIST.iter().position(|p| *p == "rm ").unwrap();
    let sudo = DENY_LIST.iter().position(|p| *p == "sudo ").unwrap();
    assert!(rm < sudo);

    match validate("sudo rm -rf /") {
        Err(ShellrunnerError::SecurityViolation(p)) => assert_eq!(p, "rm"),
        other => panic!("expected SecurityViolation, got {other:?}"),
    }
}

#[test]
fn each_category_is_blocked() {
    for cmd in [
        "shutdown -h now",
        ":(){:|:&};:",
        "cat a >> b",
        "diff <(ls) <(ls -a)",
        "wget http://example.com",
        "ssh host",
        "pkill -9 java",
        "chmod 777 x",
        "kubectl get pods",
        "helm install x",
        "DOCKER ps",
    ] {
        assert!(
            matches!(validate(cmd), Err(ShellrunnerError::SecurityViolation(_))),
            "{cmd:?} should be blocked"
        );
    }
}

#[test]
fn substring_not_word_matching() {
    // "rm " hides inside "drm ", "mkfs" does not hide inside "format".
    assert_eq!(first_violation("drm status"), Some("rm "));
    assert_eq!(first_violation("echo format"), None);
}

#[test]
fn oversize_command_is_invalid() {
    let cmd = format!("echo {}", "1".repeat(MAX_COMMAND_LEN));
    assert!(matches!(validate(&cmd), Err(ShellrunnerError::InvalidCommand(_))));
}

proptest! {
    #[test]
    fn any_deny_listed_substring_is_rejected_with_first_declared_match(
        prefix in "[a-z0-9 ]{0,40}",
        idx in 0..DENY_LIST.len(),
        suffix in "[a-z0-9 ]{0,40}",
        upper in any::<bool>(),
    ) {
        let pattern = if upper { DENY_LIST[idx].to_uppercase() } else { DENY_LIST[idx].to_string() };
        let cmd = format!("{prefix}{pattern}{suffix}");

        let lower = cmd.to_lowercase();
        let expected = DENY_LIST.iter().position(|p| lower.contains(p)).unwrap();
        prop_assert!(expected <= idx);

        match validate(&cmd) {
            Err(ShellrunnerError::SecurityViolation(found)) => {
                prop_assert_eq!(found, DENY_LIST[expected].trim());
            }
            other => prop_assert!(false, "expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn long_commands_fail_without_any_pattern(digits in "[0-9]{246,400}") {
        let cmd = format!("echo {digits}");
        prop_assert!(first_violation(&cmd).is_none());
        prop_assert!(matches!(validate(&cmd), Err(ShellrunnerError::InvalidCommand(_))));
    }
}
