//! Integration tests for command mode (-c/--command and -s/--script)

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn run_with(args: &[&str], config: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ordergrid"))
        // Tests must not depend on a user's ~/.config/ordergrid/config.toml.
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("ORDERGRID_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn run_command(args: &[&str]) -> (String, String, i32) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    run_with(args, &config)
}

fn commands(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| ["-c".to_string(), line.to_string()])
        .collect()
}

fn run_commands(lines: &[&str]) -> (String, String, i32) {
    let args = commands(lines);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_command(&args)
}

#[test]
fn test_formula_evaluation() {
    let (stdout, _, code) = run_commands(&["set A1 2", "set B1 3", "set C1 =A1+B1", "get C1"]);
    assert_eq!(stdout.trim(), "5");
    assert_eq!(code, 0);
}

#[test]
fn test_rounding_to_two_decimals() {
    let (stdout, _, code) = run_commands(&["set A1 =10/3", "get A1"]);
    assert_eq!(stdout.trim(), "3.33");
    assert_eq!(code, 0);
}

#[test]
fn test_cycle_evaluates_to_zero() {
    let (stdout, _, code) = run_commands(&["set A1 =B1", "set B1 =A1", "get A1", "get B1"]);
    assert_eq!(stdout.trim(), "0\n0");
    assert_eq!(code, 0);
}

#[test]
fn test_undo_is_bounded_to_twenty() {
    let mut lines: Vec<String> = (0..25).map(|i| format!("set A1 {}", i)).collect();
    lines.extend(std::iter::repeat_n("undo".to_string(), 20));
    lines.push("get A1".to_string());
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (stdout, _, code) = run_commands(&lines);
    assert_eq!(stdout.trim(), "4");
    assert_eq!(code, 0);

    let mut lines = lines;
    lines.insert(lines.len() - 1, "undo");
    let (stdout, stderr, code) = run_commands(&lines);
    assert_eq!(stdout.trim(), "4");
    assert!(stderr.contains("nothing to undo"), "{}", stderr);
    assert_eq!(code, 0);
}

#[test]
fn test_filter_keeps_matching_rows() {
    let (stdout, _, code) = run_commands(&[
        "set K1 123",
        "set K2 456",
        "set K3 123",
        "set K4 1234",
        "filter K 123",
        "show",
    ]);
    let rows: Vec<&str> = stdout.lines().map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(rows, vec!["1", "3"]);
    assert_eq!(code, 0);
}

#[test]
fn test_delete_whole_rows() {
    let mut lines: Vec<String> = (1..=8).map(|r| format!("set A{} {}", r, r)).collect();
    lines.extend(
        ["select rows 3 5", "delete", "get A2", "get A3", "get A5", "get A6"]
            .map(String::from),
    );
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (stdout, _, code) = run_commands(&lines);
    assert_eq!(stdout.trim(), "2\n6\n8");
    assert_eq!(code, 0);
}

#[test]
fn test_copy_paste_offsets_origin() {
    let (stdout, _, code) = run_commands(&[
        "set A1 hello",
        "set B2 7",
        "select A1:B2",
        "copy",
        "paste D5",
        "get D5",
        "get E6",
    ]);
    assert_eq!(stdout.trim(), "hello\n7");
    assert_eq!(code, 0);
}

#[test]
fn test_unknown_command_fails() {
    let (_, stderr, code) = run_commands(&["frobnicate"]);
    assert!(stderr.contains("Unknown command"));
    assert_eq!(code, 1);
}

#[test]
fn test_stdin_continues_after_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ordergrid"))
        .arg("--config")
        .arg(&config)
        .env_remove("ORDERGRID_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"frobnicate\nset A1 2\nget A1\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stdout.trim(), "2");
    assert!(stderr.contains("Error: frobnicate: Unknown command"), "{}", stderr);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_values_and_width_commands() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("truck.xls");
    let (stdout, _, code) = run_commands(&[
        "mode truck",
        "set B1 x",
        "set B2 X",
        "set B3 y",
        "values B",
        "width A 90",
        &format!("export {}", html.display()),
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "x\ny");
    let exported = std::fs::read_to_string(&html).unwrap();
    assert!(exported.contains(r#"style="width:90pt">Shipper Zip Code*</th>"#));
}

#[test]
fn test_unknown_option_fails() {
    let (_, stderr, code) = run_command(&["--bogus"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 1);
}

#[test]
fn test_save_reopen_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let book = dir.path().join("orders.json");
    let html = dir.path().join("orders.xls");
    let book_arg = book.to_str().unwrap();

    let (_, _, code) = run_commands(&["set O1 2", "set P1 4.5", "set Q1 =O1*P1", &format!("w {}", book_arg)]);
    assert_eq!(code, 0);
    assert!(book.exists());

    let (stdout, _, code) = run_command(&["-c", "get Q1", "-o", html.to_str().unwrap(), book_arg]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("9\n"));
    assert!(stdout.contains("Exported to"));
    let exported = std::fs::read_to_string(&html).unwrap();
    assert!(exported.contains(r#"x:f="=O2*P2""#));
}

#[test]
fn test_script_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "rows_per_order = 3\n").unwrap();
    let page = dir.path().join("order.txt");
    std::fs::write(
        &page,
        "订单编号：# 111-2\n您的卖家订单编号：111-2\nUS$ 1,250 商品小计:\nFedEx Ground\n",
    )
    .unwrap();
    let script = dir.path().join("run.txt");
    std::fs::write(
        &script,
        format!("# import and inspect\nimport {}\nget K3\nget BG1\nget AW3\n", page.display()),
    )
    .unwrap();

    let (stdout, stderr, code) = run_with(&["-s", script.to_str().unwrap()], &config);
    assert_eq!(code, 0, "{}", stderr);
    assert_eq!(stdout, "111-2\n1250\nFedEx Ground\n");
}

#[test]
fn test_bad_config_warns_but_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "unknown_key = 1\n").unwrap();
    let (stdout, stderr, code) = run_with(&["-c", "set A1 =2*3", "-c", "get A1"], &config);
    assert_eq!(code, 0);
    assert!(stderr.contains("Warning: Failed to parse"));
    assert_eq!(stdout.trim(), "6");
}
