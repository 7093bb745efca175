//! Runs the `vmc` binary against small fixtures written to a temp dir.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::{TempDir, tempdir};

fn vmc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vmc"))
        .args(args)
        .output()
        .expect("Failed to spawn vmc")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "vmc failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[fixture]
fn reference() -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("ref.fa"), ">chr1\nACGT\n>chr2\nTTGGGGAA\n").unwrap();
    std::fs::write(
        dir.path().join("calls.vcf"),
        "##fileformat=VCFv4.2\n\
         #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
         chr1\t1\t.\tA\tC\t.\tPASS\t.\n\
         chrM\t1\t.\tA\tC\t.\tPASS\t.\n",
    )
    .unwrap();
    dir
}

#[rstest]
#[case(&["digest", ""], "z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXc")]
#[case(&["digest", "ACGT"], "aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2")]
#[case(&["digest", "ACGT", "--length", "12"], "aKF498dAxcJAqme6")]
fn test_raw_digest(#[case] args: &[&str], #[case] expected: &str) {
    assert_eq!(stdout(&vmc(args)), expected);
}

#[rstest]
fn test_raw_digest_rejects_bad_length() {
    let output = vmc(&["digest", "ACGT", "--length", "65"]);
    assert!(!output.status.success());
}

#[rstest]
fn test_registry_then_expression(reference: TempDir) {
    let fasta = reference.path().join("ref.fa");

    let built = stdout(&vmc(&["registry", "--fasta", path_str(&fasta), "--list"]));
    assert!(built.starts_with("built 2 sequence identifiers"));
    assert!(built.contains("chr2\tVMC:GS_iYtREV555dUFKg2_agSJW6suquUyPpMw"));

    let restored = stdout(&vmc(&["registry", "--fasta", path_str(&fasta)]));
    assert!(restored.starts_with("restored 2 sequence identifiers"));

    let allele = stdout(&vmc(&[
        "expression",
        "--fasta",
        path_str(&fasta),
        "--expression",
        "chr1:g.1C",
    ]));
    assert_eq!(allele, "VMC:GA_bAH5ZSEI65Rmgj303IgKEmdIXz0EuLC7");
}

#[rstest]
fn test_expression_unknown_sequence_fails(reference: TempDir) {
    let fasta = reference.path().join("ref.fa");
    let output = vmc(&[
        "expression",
        "--fasta",
        path_str(&fasta),
        "-e",
        "chr9:g.1C",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("chr9"));
}

#[rstest]
fn test_annotate_json_summary(reference: TempDir) {
    let fasta = reference.path().join("ref.fa");
    let vcf = reference.path().join("calls.vcf");

    let text = stdout(&vmc(&[
        "annotate",
        "--fasta",
        path_str(&fasta),
        "--vcf",
        path_str(&vcf),
        "--threads",
        "2",
        "--json",
    ]));
    let summary: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(summary["records"], 2);
    assert_eq!(summary["annotated"], 1);
    assert_eq!(summary["missing_sequence"], 1);
    assert_eq!(summary["missing_names"], serde_json::json!(["chrM"]));
    assert!(reference.path().join("calls.vmc.vcf.gz").exists());
}
