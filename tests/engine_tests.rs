//! # Execution Engine Tests / 执行引擎测试
//!
//! End-to-end tests of the runner against real Unix programs (`/bin/cat`,
//! `/bin/sh`, `/bin/echo`): parallelism, bounded capture, signals, timeouts,
//! stdin delivery and result ordering.
//!
//! 针对真实 Unix 程序的运行器端到端测试：并行、有界捕获、信号、超时、
//! stdin 投递和结果顺序。

mod common;

use common::{CAT, ECHO, SH, build, sh_case};
use func_runner::core::models::{Check, EXEC_FAILURE_EXIT_CODE, SIGNAL_EXIT_CODE};
use func_runner::{
    ExitCodeValidator, Outcome, OutputValidator, RunOptions, Runner, TestCase, run,
};
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn echo_cases() -> Vec<TestCase> {
        vec![
            build(
                TestCase::builder("FirstTest")
                    .stdin("42")
                    .expect_stdout(OutputValidator::exact("42"))
                    .expect_stderr(OutputValidator::exact(""))
                    .expect_exit_code(ExitCodeValidator::equals(0)),
            ),
            build(
                TestCase::builder("SecondTest")
                    .stdin("42")
                    .expect_stdout(OutputValidator::exact("42"))
                    .expect_stderr(OutputValidator::exact("42\n"))
                    .expect_exit_code(ExitCodeValidator::equals(0)),
            ),
        ]
    }

    #[test]
    fn test_cat_echo_pass_and_wrong_stderr_expectation() {
        let report = run(CAT, &echo_cases()).unwrap();

        assert_eq!(report.total(), 2);
        let first = &report.results[0];
        assert_eq!(first.name, "FirstTest");
        assert_eq!(first.outcome, Outcome::Passed);
        assert_eq!(first.stdout, b"42");
        assert_eq!(first.exit_code, 0);

        let second = &report.results[1];
        assert_eq!(second.name, "SecondTest");
        assert_eq!(second.outcome, Outcome::Failed);
        assert_eq!(second.stdout, b"42");
        assert!(second.stderr.is_empty());
        assert_eq!(second.failed_checks.len(), 1);
        let failure = second.failed_check(Check::Stderr).unwrap();
        assert_eq!(failure.expected.as_deref(), Some("\"42\\n\""));
        assert_eq!(failure.actual, "\"\"");

        assert_eq!(report.passed_count(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_copy_program_scenarios() {
        let cases = vec![
            build(
                TestCase::builder("A")
                    .stdin("42\n")
                    .expect_stdout(OutputValidator::exact("42\n"))
                    .expect_exit_code(ExitCodeValidator::equals(0)),
            ),
            build(
                TestCase::builder("B")
                    .stdin("43\n")
                    .expect_stdout(OutputValidator::exact("43\n"))
                    .expect_stderr(OutputValidator::exact("42\n")),
            ),
            build(
                TestCase::builder("off-by-one")
                    .stdin("X")
                    .expect_stdout(OutputValidator::exact("Y")),
            ),
        ];
        let report = run(CAT, &cases).unwrap();

        assert_eq!(report.results[0].outcome, Outcome::Passed);
        assert_eq!(report.results[1].outcome, Outcome::Failed);
        let stderr = report.results[1].failed_check(Check::Stderr).unwrap();
        assert_eq!(stderr.expected.as_deref(), Some("\"42\\n\""));
        assert_eq!(stderr.actual, "\"\"");
        assert!(report.results[1].failed_check(Check::Stdout).is_none());
        assert_eq!(report.results[2].outcome, Outcome::Failed);
        assert!(report.results[2].failed_check(Check::Stdout).is_some());
    }

    #[test]
    fn test_results_keep_input_order() {
        // Later cases finish first.
        let cases: Vec<TestCase> = (0..6)
            .map(|i| {
                let script = format!("sleep 0.{}; echo {i}", 5 - i);
                build(
                    sh_case(&format!("case-{i}"), &script)
                        .expect_stdout(OutputValidator::exact(format!("{i}\n"))),
                )
            })
            .collect();

        let report = run(SH, &cases).unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["case-0", "case-1", "case-2", "case-3", "case-4", "case-5"]);
        assert!(report.all_passed());
        assert_eq!(report.get("case-4").unwrap().stdout, b"4\n");
        assert!(report.get("case-9").is_none());
    }

    #[test]
    fn test_repeated_runs_give_same_outcomes() {
        let cases = echo_cases();
        let first = run(CAT, &cases).unwrap();
        let second = run(CAT, &cases).unwrap();

        for (a, b) in first.results.iter().zip(&second.results) {
            assert_eq!(a.outcome, b.outcome);
            assert_eq!(a.stdout, b.stdout);
            assert_eq!(a.stderr, b.stderr);
            assert_eq!(a.exit_code, b.exit_code);
        }
    }

    #[test]
    fn test_empty_case_list_yields_empty_report() {
        let report = run(CAT, &[]).unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.all_passed());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let cases = vec![
            build(TestCase::builder("same")),
            build(TestCase::builder("same")),
        ];
        let err = run(CAT, &cases).unwrap_err();
        assert!(err.to_string().contains("Duplicate test case name"));
    }

    #[test]
    fn test_args_are_passed_verbatim() {
        let case = build(
            TestCase::builder("echo-args")
                .args(["a", "b c"])
                .expect_stdout(OutputValidator::exact("a b c\n")),
        );
        let report = run(ECHO, &[case]).unwrap();
        assert_eq!(report.results[0].outcome, Outcome::Passed);
    }

    #[test]
    fn test_stdout_and_stderr_are_captured_separately() {
        let case = build(
            sh_case("split", "echo out; echo err >&2; exit 4")
                .expect_stdout(OutputValidator::exact("out\n"))
                .expect_stderr(OutputValidator::exact("err\n"))
                .expect_exit_code(ExitCodeValidator::equals(4)),
        );
        let report = run(SH, &[case]).unwrap();
        assert_eq!(report.results[0].outcome, Outcome::Passed);
        assert_eq!(report.results[0].exit_code, 4);
    }

    #[test]
    fn test_custom_and_rule_validators() {
        let cases = vec![
            build(
                sh_case("lines", "printf 'a\\nb\\nc\\n'").expect_stdout(OutputValidator::from_fn(
                    "three lines",
                    |out: &[u8]| out.iter().filter(|&&b| b == b'\n').count() == 3,
                )),
            ),
            build(sh_case("one-of", "exit 2").expect_exit_code(ExitCodeValidator::one_of([1, 2]))),
            build(sh_case("must-fail", "exit 1").expect_exit_code(ExitCodeValidator::not(0))),
            build(
                sh_case("regex", "echo version 1.2.3")
                    .expect_stdout(OutputValidator::matches(r"^version \d+\.\d+\.\d+\n$").unwrap()),
            ),
            build(
                sh_case("contains", "echo warning: low disk >&2")
                    .expect_stderr(OutputValidator::contains("low disk")),
            ),
        ];
        let report = run(SH, &cases).unwrap();
        for result in &report.results {
            assert_eq!(
                result.outcome,
                Outcome::Passed,
                "{} failed: {:?}",
                result.name,
                result.failed_checks
            );
        }
    }
}

#[cfg(test)]
mod capture_tests {
    use super::*;

    #[test]
    fn test_output_is_truncated_at_capacity() {
        let case = build(sh_case("flood", "dd if=/dev/zero bs=1000 count=10 2>/dev/null"));
        let report = run(SH, &[case]).unwrap();
        let result = &report.results[0];

        assert_eq!(result.stdout.len(), 4096);
        assert_eq!(result.stdout_dropped, 10_000 - 4096);
        assert!(result.stdout_truncated());
        assert!(result.stdout.iter().all(|&b| b == 0));
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_output_exactly_at_capacity_is_not_truncated() {
        let cases = vec![
            build(sh_case("exact", "head -c 4096 /dev/zero")),
            build(sh_case("one-over", "head -c 4097 /dev/zero")),
        ];
        let report = run(SH, &cases).unwrap();

        assert_eq!(report.results[0].stdout.len(), 4096);
        assert!(!report.results[0].stdout_truncated());
        assert_eq!(report.results[1].stdout.len(), 4096);
        assert_eq!(report.results[1].stdout_dropped, 1);
    }

    #[test]
    fn test_large_stdin_does_not_deadlock() {
        let payload: Vec<u8> = (0..1 << 20).map(|i| (i % 251) as u8).collect();
        let case = build(TestCase::builder("mib").stdin(payload.clone()));

        let report = run(CAT, &[case]).unwrap();
        let result = &report.results[0];
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, &payload[..4096]);
        assert_eq!(result.stdout_dropped, payload.len() - 4096);
    }

    #[test]
    fn test_large_capacity_round_trips_stdin() {
        let payload: Vec<u8> = (0..1 << 20).map(|i| (i % 253) as u8).collect();
        let case = build(
            TestCase::builder("mib-full")
                .stdin(payload.clone())
                .expect_stdout(OutputValidator::exact(payload.clone())),
        );
        let options = RunOptions {
            buffer_capacity: 2 << 20,
            ..RunOptions::default()
        };

        let report = Runner::new(CAT).with_options(options).run(&[case]).unwrap();
        assert_eq!(report.results[0].outcome, Outcome::Passed);
        assert_eq!(report.results[0].stdout.len(), payload.len());
    }

    #[test]
    fn test_child_exiting_without_reading_stdin() {
        let payload = vec![b'x'; 1 << 20];
        let case = build(
            sh_case("ignores-stdin", "exit 3")
                .stdin(payload)
                .expect_exit_code(ExitCodeValidator::equals(3)),
        );
        let report = run(SH, &[case]).unwrap();
        assert_eq!(report.results[0].outcome, Outcome::Passed);
    }

    #[test]
    fn test_stdin_is_delivered_after_output_streams_close() {
        // The child closes both output streams before it starts reading.
        let payload = vec![b'y'; 1 << 20];
        let case = build(
            sh_case(
                "reads-after-closing-output",
                "exec 1>&- 2>&-; sleep 0.5; n=$(wc -c); [ \"$n\" -eq 1048576 ]",
            )
            .stdin(payload)
            .timeout(Duration::from_secs(20))
            .expect_exit_code(ExitCodeValidator::equals(0)),
        );

        let report = run(SH, &[case]).unwrap();
        let result = &report.results[0];
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.outcome, Outcome::Passed);
    }

    #[test]
    fn test_flooding_producer_does_not_starve_other_tests() {
        let cases = vec![
            build(sh_case("flood", "yes").timeout(Duration::from_secs(1))),
            build(
                TestCase::builder("quiet")
                    .args(["-c", "cat"])
                    .stdin("ping")
                    .expect_stdout(OutputValidator::exact("ping")),
            ),
        ];

        let start = Instant::now();
        let report = run(SH, &cases).unwrap();
        assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());

        let flood = report.get("flood").unwrap();
        assert!(flood.is_timeout());
        assert_eq!(flood.stdout.len(), 4096);
        assert!(flood.stdout_dropped > 0);
        assert_eq!(report.get("quiet").unwrap().outcome, Outcome::Passed);
    }
}

#[cfg(test)]
mod process_tests {
    use super::*;

    #[test]
    fn test_tests_run_in_parallel() {
        let cases: Vec<TestCase> = (0..8)
            .map(|i| build(sh_case(&format!("sleep-{i}"), "sleep 1")))
            .collect();

        let start = Instant::now();
        let report = run(SH, &cases).unwrap();
        assert!(report.all_passed());
        assert!(start.elapsed() < Duration::from_secs(4), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_signal_death_reports_sentinel_exit_code() {
        let case = build(
            sh_case("self-kill", "kill -9 $$")
                .expect_exit_code(ExitCodeValidator::equals(SIGNAL_EXIT_CODE)),
        );
        let report = run(SH, &[case]).unwrap();
        let result = &report.results[0];
        assert_eq!(result.exit_code, -1);
        assert_eq!(result.signal, Some(9));
        assert_eq!(result.outcome, Outcome::Passed);
    }

    #[test]
    fn test_exec_failure_reports_127() {
        let case = build(TestCase::builder("missing"));
        let report = run("/nonexistent/func-runner-program", &[case]).unwrap();
        let result = &report.results[0];

        assert_eq!(result.exit_code, EXEC_FAILURE_EXIT_CODE);
        assert!(matches!(result.outcome, Outcome::LaunchFailed { .. }));
        assert!(!result.passed());
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn test_timeout_kills_the_process() {
        let case = build(sh_case("hang", "sleep 30").timeout(Duration::from_millis(200)));

        let start = Instant::now();
        let report = run(SH, &[case]).unwrap();
        let result = &report.results[0];

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(result.is_timeout());
        assert_eq!(result.exit_code, SIGNAL_EXIT_CODE);
        assert_eq!(result.signal, Some(9));
    }

    #[test]
    fn test_timeout_kills_the_whole_process_group() {
        // The background sleep inherits stdout; only a group kill closes it.
        let case = build(sh_case("orphan", "sleep 30 & wait").timeout(Duration::from_millis(300)));

        let start = Instant::now();
        let report = run(SH, &[case]).unwrap();
        assert!(report.results[0].is_timeout());
        assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_default_timeout_applies_to_cases_without_one() {
        let cases = vec![
            build(sh_case("slow", "sleep 30")),
            build(sh_case("fast", "echo done").expect_stdout(OutputValidator::exact("done\n"))),
        ];
        let options = RunOptions {
            default_timeout: Some(Duration::from_millis(300)),
            ..RunOptions::default()
        };

        let report = Runner::new(SH).with_options(options).run(&cases).unwrap();
        assert!(report.results[0].is_timeout());
        assert_eq!(report.results[1].outcome, Outcome::Passed);
    }

    #[test]
    fn test_cancellation_stops_running_tests() {
        let token = CancellationToken::new();
        let canceller = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                token.cancel();
            })
        };
        let options = RunOptions {
            cancel: Some(token),
            ..RunOptions::default()
        };
        let cases = vec![build(sh_case("long", "sleep 30"))];

        let start = Instant::now();
        let report = Runner::new(SH).with_options(options).run(&cases).unwrap();
        canceller.join().unwrap();

        assert_eq!(report.results[0].outcome, Outcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
