use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use simscan_core::varint::encode_varint;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_simscan"))
}

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "simscan_cli_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn field_varint(field: u32, value: u64) -> Vec<u8> {
    let mut out = encode_varint(u64::from(field) << 3);
    out.extend(encode_varint(value));
    out
}

fn field_fixed64(field: u32, value: u64) -> Vec<u8> {
    let mut out = encode_varint((u64::from(field) << 3) | 1);
    out.extend_from_slice(&value.to_le_bytes());
    out
}

fn field_str(field: u32, text: &str) -> Vec<u8> {
    let mut out = encode_varint((u64::from(field) << 3) | 2);
    out.extend(encode_varint(text.len() as u64));
    out.extend_from_slice(text.as_bytes());
    out
}

fn field_bytes(field: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = encode_varint((u64::from(field) << 3) | 2);
    out.extend(encode_varint(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

/// A one-sim save: DBPF header, a plain zone entry, a one-row index.
fn write_sample_save(name: &str) -> PathBuf {
    let mut sim = field_fixed64(1, 0xC0FFEE);
    sim.extend(field_str(5, "Vlad"));
    sim.extend(field_str(6, "Straud"));
    sim.extend(field_varint(7, 4096));
    sim.extend(field_varint(8, 32));
    let zone = field_bytes(6, &sim);

    let mut archive = vec![0u8; 96];
    archive[0..4].copy_from_slice(b"DBPF");
    let data_offset = archive.len() as u32;
    archive.extend_from_slice(&zone);
    let index_offset = archive.len() as u64;
    archive.extend_from_slice(&0u32.to_le_bytes());
    archive.extend_from_slice(&0x0Du32.to_le_bytes());
    archive.extend_from_slice(&0u32.to_le_bytes());
    archive.extend_from_slice(&0u32.to_le_bytes());
    archive.extend_from_slice(&1u32.to_le_bytes());
    archive.extend_from_slice(&data_offset.to_le_bytes());
    archive.extend_from_slice(&(zone.len() as u32).to_le_bytes());
    archive.extend_from_slice(&(zone.len() as u32).to_le_bytes());
    archive[36..40].copy_from_slice(&1u32.to_le_bytes());
    archive[64..72].copy_from_slice(&index_offset.to_le_bytes());

    let path = temp_path(name);
    fs::write(&path, archive).unwrap();
    path
}

#[test]
fn analyze_text_output_lists_the_sim() {
    let save = write_sample_save("analyze.save");
    let output = bin().arg("analyze").arg(&save).output().unwrap();
    fs::remove_file(&save).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1 sims"));
    assert!(stdout.contains("Vlad Straud"));
    assert!(stdout.contains("Adult"));
}

#[test]
fn analyze_json_output_parses() {
    let save = write_sample_save("analyze_json.save");
    let output = bin()
        .arg("analyze")
        .arg(&save)
        .arg("--json")
        .output()
        .unwrap();
    fs::remove_file(&save).ok();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["sims"], 1);
    assert_eq!(json["sims"][0]["name"], "Vlad Straud");
    assert_eq!(json["sims"][0]["gender"], "Male");
}

#[test]
fn analyze_with_cache_file_writes_the_cache() {
    let save = write_sample_save("analyze_cached.save");
    let cache = temp_path("cli.cache");
    let output = bin()
        .arg("analyze")
        .arg(&save)
        .arg("--cache-file")
        .arg(&cache)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(cache.is_file());

    // Second run hits the cache and produces the same text.
    let second = bin()
        .arg("analyze")
        .arg(&save)
        .arg("--cache-file")
        .arg(&cache)
        .output()
        .unwrap();
    assert_eq!(output.stdout, second.stdout);

    fs::remove_file(&save).ok();
    fs::remove_file(&cache).ok();
}

#[test]
fn analyze_missing_file_fails_with_message() {
    let output = bin()
        .arg("analyze")
        .arg(temp_path("absent.save"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("save file not found"));
}

#[test]
fn entries_lists_the_index() {
    let save = write_sample_save("entries.save");
    let output = bin().arg("entries").arg(&save).output().unwrap();
    fs::remove_file(&save).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("0x0000000d"));
    assert!(stdout.contains("1 entries"));
}

#[test]
fn extract_writes_the_entry_payload() {
    let save = write_sample_save("extract.save");
    let out_file = temp_path("extracted.bin");
    let output = bin()
        .arg("extract")
        .arg(&save)
        .arg("--type")
        .arg("0x0D")
        .arg("--instance")
        .arg("0x1")
        .arg("-o")
        .arg(&out_file)
        .output()
        .unwrap();
    fs::remove_file(&save).ok();

    assert!(output.status.success());
    let payload = fs::read(&out_file).unwrap();
    fs::remove_file(&out_file).ok();
    // The zone blob starts with the length-delimited sim field tag.
    assert_eq!(payload[0], 0x32);
}

#[test]
fn extract_unknown_entry_fails() {
    let save = write_sample_save("extract_missing.save");
    let output = bin()
        .arg("extract")
        .arg(&save)
        .arg("--type")
        .arg("0xFF")
        .arg("--instance")
        .arg("0x1")
        .output()
        .unwrap();
    fs::remove_file(&save).ok();
    assert!(!output.status.success());
}

#[test]
fn tray_command_indexes_a_folder() {
    let dir = temp_path("cli_tray");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("0x0!0x0000000000000042.sgi"), vec![0u8; 64]).unwrap();
    let mut sim = field_fixed64(1, 0x42);
    sim.extend(field_str(3, "Tray"));
    sim.extend(field_str(4, "Sim"));
    let mut household = vec![0u8; 16];
    household.extend(field_bytes(2, &sim));
    fs::write(dir.join("fam.householdbinary"), household).unwrap();

    let output = bin().arg("tray").arg(&dir).output().unwrap();
    fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1 portraits across 1 households"));
    assert!(stdout.contains("* Tray Sim"));
}

#[test]
fn portrait_command_decodes_to_jpeg_file() {
    let key = [0x41u8, 0x25, 0xE6, 0xCD, 0x47, 0xBA, 0xB2, 0x1A];
    let payload = b"\xFF\xD8fake jpeg body".to_vec();
    let mut file = vec![0u8; 24];
    file.extend(payload.iter().enumerate().map(|(i, b)| b ^ key[i % 8]));

    let sgi_path = temp_path("portrait.sgi");
    let out_path = temp_path("portrait.jpg");
    fs::write(&sgi_path, file).unwrap();

    let output = bin()
        .arg("portrait")
        .arg(&sgi_path)
        .arg("-o")
        .arg(&out_path)
        .output()
        .unwrap();
    fs::remove_file(&sgi_path).ok();

    assert!(output.status.success());
    assert_eq!(fs::read(&out_path).unwrap(), payload);
    fs::remove_file(&out_path).ok();
}
