//! End-to-end tests for the fusion-overlap binary.
//!
//! Tests cover:
//! 1. List output header and rows
//! 2. Summary output to stdout and to a file
//! 3. Sparse mode, extensive output and the pairwise subcommand
//! 4. Gene annotation lookup
//! 5. Error handling for bad flags and malformed input

use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// Helper functions
// =============================================================================

fn create_fusion_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn run_overlap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fusion-overlap"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run fusion-overlap")
}

fn is_success(output: &Output) -> bool {
    output.status.success()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn dataset_arg(name: &str, file: &NamedTempFile) -> String {
    format!("{}:{}", name, file.path().to_str().unwrap())
}

// =============================================================================
// Test fixtures
// =============================================================================

const TMPRSS2_ERG: &str = "chr21\t42880008\tchr21\t39817544\t-\t-\tTMPRSS2\tERG\n";
const EML4_ALK: &str = "chr2\t42522656\tchr2\t29446394\t+\t-\tEML4\tALK\n";
const BCR_ABL1: &str = "chr22\t23632600\tchr9\t133729451\t+\t+\tBCR\tABL1\n";
/// BCR-ABL1 reported with partners swapped.
const ABL1_BCR: &str = "chr9\t133729451\tchr22\t23632600\t+\t+\tABL1\tBCR\n";

struct Fixture {
    a: NamedTempFile,
    b: NamedTempFile,
    c: NamedTempFile,
}

impl Fixture {
    /// A: TMPRSS2-ERG, EML4-ALK, BCR-ABL1; B: TMPRSS2-ERG, EML4-ALK; C: TMPRSS2-ERG, ABL1-BCR.
    fn new() -> Self {
        Self {
            a: create_fusion_file(&format!("{}{}{}", TMPRSS2_ERG, EML4_ALK, BCR_ABL1)),
            b: create_fusion_file(&format!("{}{}", TMPRSS2_ERG, EML4_ALK)),
            c: create_fusion_file(&format!("{}{}", TMPRSS2_ERG, ABL1_BCR)),
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-a".to_string(),
            dataset_arg("A", &self.a),
            "-a".to_string(),
            dataset_arg("B", &self.b),
            "-a".to_string(),
            dataset_arg("C", &self.c),
        ]
    }
}

fn run_with(fixture: &Fixture, extra: &[&str]) -> Output {
    let dataset_args = fixture.args();
    let mut args: Vec<&str> = vec!["overlay"];
    args.extend(dataset_args.iter().map(String::as_str));
    args.extend_from_slice(extra);
    run_overlap(&args)
}

// =============================================================================
// List output
// =============================================================================

#[test]
fn test_list_header() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-f", "list"]);

    assert!(is_success(&output), "stderr: {}", stderr(&output));
    let result = stdout(&output);
    assert_eq!(
        result.lines().next(),
        Some("Left-genes\tRight-genes\tA\tB\tC")
    );
}

#[test]
fn test_list_reports_each_fusion_at_largest_combination() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-f", "list"]);

    assert!(is_success(&output));
    let result = stdout(&output);
    let rows: Vec<Vec<&str>> = result.lines().skip(1).map(|l| l.split('\t').collect()).collect();

    // EML4-ALK is only in A and B: one row from A.B with C empty.
    let eml4: Vec<&Vec<&str>> = rows.iter().filter(|r| r[0] == "EML4").collect();
    assert_eq!(eml4.len(), 1);
    assert!(!eml4[0][2].is_empty() && !eml4[0][3].is_empty() && eml4[0][4].is_empty());

    // The final row is the three-way TMPRSS2-ERG merge.
    let last = rows.last().unwrap();
    assert_eq!(last[0], "TMPRSS2");
    assert_eq!(last[1], "ERG");
    assert!(last[2..].iter().all(|c| c.starts_with("chr21:42880008")));
}

#[test]
fn test_list_strand_specific_keeps_swapped_partners_apart() {
    let fixture = Fixture::new();

    let loose = stdout(&run_with(&fixture, &["-f", "list"]));
    let strict = stdout(&run_with(&fixture, &["-f", "list", "--strand-specific"]));

    // Without strand-specific matching A's BCR-ABL1 pairs with C's ABL1-BCR.
    let bcr_rows = |text: &str| {
        text.lines()
            .filter(|l| l.starts_with("BCR") || l.starts_with("ABL1"))
            .count()
    };
    assert_eq!(bcr_rows(&loose), 1);
    assert_eq!(bcr_rows(&strict), 2);
}

// =============================================================================
// Summary output
// =============================================================================

#[test]
fn test_summary_to_stdout() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-f", "summary"]);

    assert!(is_success(&output), "stderr: {}", stderr(&output));
    let result = stdout(&output);
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines[0], "\tA (3)\tB (2)\tC (2)");
    // A & B share 2, A & C share 2 (TMPRSS2-ERG and swapped BCR-ABL1).
    assert_eq!(
        lines[1],
        "A (3)\t\t2/3 (66.67%) : 2/2 (100.0%)\t2/3 (66.67%) : 2/2 (100.0%)"
    );
    assert!(result.contains("A & B (2)\t\t\t1/2 (50.0%) : 1/2 (50.0%)"));
}

#[test]
fn test_sparse_summary_matches_dense() {
    let fixture = Fixture::new();
    let dense = run_with(&fixture, &["-f", "summary"]);
    let sparse = run_with(&fixture, &["-f", "summary", "--sparse"]);

    assert!(is_success(&sparse), "stderr: {}", stderr(&sparse));
    assert_eq!(stdout(&dense), stdout(&sparse));
}

#[test]
fn test_summary_to_file() {
    let fixture = Fixture::new();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("summary.txt");

    let output = run_with(&fixture, &["-o", path.to_str().unwrap()]);

    assert!(is_success(&output));
    assert!(stdout(&output).is_empty());
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("\tA (3)\tB (2)\tC (2)\n"));
}

#[test]
fn test_exact_gene_match_flag() {
    let a = create_fusion_file("chr21\t1\tchr21\t2\t-\t-\tTMPRSS2\tERG;ERG-AS1\n");
    let b = create_fusion_file("chr21\t1\tchr21\t2\t-\t-\tTMPRSS2\tERG\n");
    let a_arg = dataset_arg("A", &a);
    let b_arg = dataset_arg("B", &b);

    let loose = run_overlap(&["overlay", "-a", &a_arg, "-a", &b_arg]);
    let exact = run_overlap(&["overlay", "-a", &a_arg, "-a", &b_arg, "--egm"]);

    assert!(stdout(&loose).contains("1/1 (100.0%)"));
    assert!(stdout(&exact).contains("0/1 (0.0%)"));
}

// =============================================================================
// Extensive output and pairwise export
// =============================================================================

#[test]
fn test_extensive_writes_junction_files() {
    let fixture = Fixture::new();
    let dir = TempDir::new().unwrap();
    let export_dir = dir.path().join("junctions");

    let output = run_with(
        &fixture,
        &["-f", "extensive", "--export-dir", export_dir.to_str().unwrap()],
    );

    assert!(is_success(&output), "stderr: {}", stderr(&output));
    for name in ["A_vs._B", "A_vs._C", "B_vs._C", "A_vs._B_vs._C"] {
        let path = export_dir.join(format!("{}.junctions.txt", name));
        assert!(path.exists(), "missing {}", path.display());
    }
    let three_way =
        std::fs::read_to_string(export_dir.join("A_vs._B_vs._C.junctions.txt")).unwrap();
    assert_eq!(three_way.lines().count(), 2);
}

#[test]
fn test_pairwise_subcommand() {
    let fixture = Fixture::new();
    let dir = TempDir::new().unwrap();
    let dataset_args = fixture.args();

    let mut args: Vec<&str> = vec!["pairwise"];
    args.extend(dataset_args.iter().map(String::as_str));
    args.extend_from_slice(&["-d", dir.path().to_str().unwrap(), "--prefix", "run1_"]);
    let output = run_overlap(&args);

    assert!(is_success(&output), "stderr: {}", stderr(&output));
    let a_vs_b = std::fs::read_to_string(dir.path().join("run1_A_vs._B.txt")).unwrap();
    // Header plus TMPRSS2-ERG and EML4-ALK
    assert_eq!(a_vs_b.lines().count(), 3);
    assert!(dir.path().join("run1_C_vs._A.txt").exists());
}

// =============================================================================
// Gene annotation
// =============================================================================

#[test]
fn test_gene_annotation_fills_breakpoints() {
    let genes = create_fusion_file("chr21\t42836478\t42903043\tTMPRSS2\nchr21\t38380027\t38661780\tERG\n");
    let a = create_fusion_file("chr21\t42880008\tchr21\t38445621\n");
    let b = create_fusion_file("chr21\t42866283\tchr21\t38445621\n");
    let a_arg = dataset_arg("A", &a);
    let b_arg = dataset_arg("B", &b);

    let output = run_overlap(&[
        "overlay",
        "-a",
        &a_arg,
        "-a",
        &b_arg,
        "-g",
        genes.path().to_str().unwrap(),
        "-f",
        "list",
    ]);

    assert!(is_success(&output), "stderr: {}", stderr(&output));
    let result = stdout(&output);
    let lines: Vec<&str> = result.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("TMPRSS2\tERG\t"));
}

// =============================================================================
// Error handling
// =============================================================================

#[test]
fn test_sparse_list_is_rejected() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-f", "list", "--sparse"]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("Sparse mode"), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_invalid_format() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-f", "table"]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("Invalid output format"));
}

#[test]
fn test_malformed_dataset_argument() {
    let output = run_overlap(&["overlay", "-a", "no-path-here"]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("NAME:PATH"));
}

#[test]
fn test_missing_input_file() {
    let output = run_overlap(&["overlay", "-a", "A:/nonexistent/fusions.txt"]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("I/O error"));
}

#[test]
fn test_malformed_fusion_line() {
    let a = create_fusion_file("chr21\t100\tchr21\n");
    let a_arg = dataset_arg("A", &a);
    let output = run_overlap(&["overlay", "-a", &a_arg]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("Parse error at line 1"));
}

#[test]
fn test_unwritable_output() {
    let fixture = Fixture::new();
    let output = run_with(&fixture, &["-o", "/nonexistent-dir/summary.txt"]);

    assert!(!is_success(&output));
    assert!(stderr(&output).contains("I/O error"));
}

#[test]
fn test_single_dataset_is_noop() {
    let a = create_fusion_file(TMPRSS2_ERG);
    let a_arg = dataset_arg("A", &a);
    let output = run_overlap(&["overlay", "-a", &a_arg]);

    assert!(is_success(&output));
    assert!(stdout(&output).is_empty());
}
