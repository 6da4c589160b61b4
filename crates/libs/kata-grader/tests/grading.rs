//! End-to-end grading with the real cargo toolchain.

use kata_grader::{GradingEngine, TestDefinition, TestKind};

const COUNTER: &str = r#"fn main() {
    let mut count = 0;
    count += 1;
    println!("Count: {}", count);
}
"#;

const BROKEN: &str = r#"fn main() {
    let count = 0
    println!("Count: {}", count);
}
"#;

const CONVERTER: &str = r#"fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("usage: <degrees> <unit>");
        std::process::exit(2);
    }
    let degrees: f64 = args[0].parse().unwrap();
    match args[1].as_str() {
        "F" => println!("{:.1}C", (degrees - 32.0) * 5.0 / 9.0),
        _ => println!("{:.1}F", degrees * 9.0 / 5.0 + 32.0),
    }
}
"#;

#[tokio::test]
async fn passing_functional_test() {
    let tests = vec![
        TestDefinition::new("prints count", TestKind::Functional)
            .with_command("cargo run")
            .with_expected_output("Count: 1")
            .with_expected_exit_code(0),
    ];

    let run = GradingEngine::default().grade(COUNTER, &tests).await;

    assert!(run.success, "{run:?}");
    assert!(run.results[0].passed);
    assert_eq!(run.compilation_error, None);
}

#[tokio::test]
async fn syntax_error_fails_compilation_and_functional_tests() {
    let tests = vec![
        TestDefinition::new("compiles", TestKind::Compilation),
        TestDefinition::new("prints count", TestKind::Functional)
            .with_command("cargo run")
            .with_expected_output("Count: 0"),
    ];

    let run = GradingEngine::default().grade(BROKEN, &tests).await;

    assert!(!run.success);
    let compilation_error = run.compilation_error.clone().expect("compilation error");
    assert!(compilation_error.contains("error"), "{compilation_error}");
    assert_eq!(run.results[0].error.as_ref(), Some(&compilation_error));
    assert_eq!(run.results[1].error.as_ref(), Some(&compilation_error));
    assert_eq!(run.results[1].output, None);
}

#[tokio::test]
async fn code_quality_contains() {
    let tests = vec![
        TestDefinition::new("uses mut", TestKind::CodeQuality).with_check("contains 'mut count'"),
    ];
    let engine = GradingEngine::default();

    let run = engine.grade(COUNTER, &tests).await;
    assert!(run.success, "{run:?}");

    let immutable = COUNTER
        .replace("let mut count = 0;", "let count = 0;")
        .replace("count += 1;", "");
    let run = engine.grade(&immutable, &tests).await;
    assert!(!run.success);
    assert_eq!(
        run.results[0].error.as_deref(),
        Some("Code quality check failed")
    );
}

#[tokio::test]
async fn arguments_and_exit_codes_across_runs() {
    let tests = vec![
        TestDefinition::new("fahrenheit", TestKind::Functional)
            .with_command("cargo run -- 212 F")
            .with_expected_output("100.0C"),
        TestDefinition::new("celsius", TestKind::Functional)
            .with_command("cargo run -- 100 C")
            .with_expected_output("212.0F"),
        TestDefinition::new("usage", TestKind::Functional)
            .with_command("cargo run")
            .with_expected_exit_code(2),
    ];

    let run = GradingEngine::default().grade(CONVERTER, &tests).await;

    assert!(run.success, "{run:?}");
}
