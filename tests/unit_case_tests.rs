//! # Test Case Unit Tests / 测试用例单元测试
//!
//! Builder defaults and validation, and the behavior of every validator kind.
//!
//! 构建器的默认值与校验，以及各类验证器的行为。

use func_runner::{ExitCodeValidator, OutputValidator, TestCase};
use std::time::Duration;

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn test_defaults_accept_anything() {
        let case = TestCase::builder("defaults").build().unwrap();

        assert_eq!(case.name(), "defaults");
        assert!(case.stdin().is_empty());
        assert!(case.args().is_empty());
        assert_eq!(case.timeout(), None);
        assert!(case.stdout_validator().check(b"anything"));
        assert!(case.stderr_validator().check(b""));
        assert!(case.exit_code_validator().check(&-1));
        assert!(case.exit_code_validator().check(&127));
        assert_eq!(case.stdout_validator().expectation(), None);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let case = TestCase::builder("full")
            .stdin("input")
            .arg("-n")
            .arg("3")
            .expect_stdout(OutputValidator::exact("out"))
            .expect_exit_code(ExitCodeValidator::equals(2))
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(case.stdin(), b"input");
        assert_eq!(case.args(), ["-n", "3"]);
        assert_eq!(case.timeout(), Some(Duration::from_secs(5)));
        assert!(case.stdout_validator().check(b"out"));
        assert!(!case.exit_code_validator().check(&0));
    }

    #[test]
    fn test_args_replaces_previous_arguments() {
        let case = TestCase::builder("args")
            .arg("old")
            .args(["new", "list"])
            .build()
            .unwrap();
        assert_eq!(case.args(), ["new", "list"]);
    }

    #[test]
    fn test_cloned_builder_seeds_several_cases() {
        let base = TestCase::builder("base").expect_exit_code(ExitCodeValidator::equals(0));
        let a = base.clone().name("a").stdin("1").build().unwrap();
        let b = base.name("b").stdin("2").build().unwrap();

        assert_eq!(a.name(), "a");
        assert_eq!(b.stdin(), b"2");
        assert!(a.exit_code_validator().check(&0));
        assert!(!b.exit_code_validator().check(&1));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(TestCase::builder("").build().is_err());
        assert!(TestCase::builder("   ").build().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = TestCase::builder("zero")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("zero timeout"));
    }
}

#[cfg(test)]
mod validator_tests {
    use super::*;

    #[test]
    fn test_exact_is_byte_for_byte() {
        let validator = OutputValidator::exact("42\n");
        assert!(validator.check(b"42\n"));
        assert!(!validator.check(b"42"));
        assert!(!validator.check(b"42\n\n"));
        assert_eq!(validator.expectation(), Some("\"42\\n\""));
    }

    #[test]
    fn test_exact_handles_binary_data() {
        let validator = OutputValidator::exact(vec![0u8, 255, 10]);
        assert!(validator.check(&[0u8, 255, 10]));
        assert!(!validator.check(&[0u8, 255]));
    }

    #[test]
    fn test_contains() {
        let validator = OutputValidator::contains("needle");
        assert!(validator.check(b"hay needle stack"));
        assert!(!validator.check(b"haystack"));
        assert!(OutputValidator::contains("").check(b""));
    }

    #[test]
    fn test_matches_regex() {
        let validator = OutputValidator::matches(r"^\d+ items?$").unwrap();
        assert!(validator.check(b"3 items"));
        assert!(validator.check(b"1 item"));
        assert!(!validator.check(b"many items"));
        assert!(OutputValidator::matches("(unclosed").is_err());
    }

    #[test]
    fn test_exit_code_validators() {
        let one_of = ExitCodeValidator::one_of([1, 2]);
        assert!(one_of.check(&2));
        assert!(!one_of.check(&0));
        assert_eq!(one_of.expectation(), Some("one of [1, 2]"));

        let not_zero = ExitCodeValidator::not(0);
        assert!(not_zero.check(&1));
        assert!(not_zero.check(&-1));
        assert!(!not_zero.check(&0));
    }

    #[test]
    fn test_from_fn_wraps_any_predicate() {
        let validator = OutputValidator::from_fn("ends with newline", |out: &[u8]| {
            out.last() == Some(&b'\n')
        });
        assert!(validator.check(b"line\n"));
        assert!(!validator.check(b"line"));
        assert_eq!(validator.expectation(), Some("ends with newline"));

        let even = ExitCodeValidator::from_fn("even", |code: &i32| code % 2 == 0);
        assert!(even.check(&4));
        assert!(!even.check(&3));
    }

    #[test]
    fn test_cloned_validator_shares_the_predicate() {
        let validator = OutputValidator::exact("x");
        let clone = validator.clone();
        assert!(clone.check(b"x"));
        assert_eq!(format!("{clone:?}"), "Validator(\"x\")");
        assert_eq!(format!("{:?}", OutputValidator::accept_all()), "Validator(<any>)");
    }
}
