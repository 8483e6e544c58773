// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    csv          = { "data/iowa/entities_20251001.csv", ".csv" },
    json         = { "exports/roll.json",               ".json" },
    query_string = { "https://host/data/roll.csv?sig=abc", ".csv" },
    fragment     = { "https://host/data/roll.csv#part",    ".csv" },
    no_extension = { "data/roll",                       ".dat" },
    dotfile      = { "data/.hidden",                    ".dat" },
)]
fn extension_inference(key: &str, expected: &str) {
    assert_eq!(extension_of(key), expected);
}

#[tokio::test]
async fn local_path_is_used_in_place() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let source = InputSource::LocalPath(file.path().to_string_lossy().into_owned());
    let acquired = acquire(&source).await.unwrap();
    assert_eq!(acquired.path(), file.path());
}

#[tokio::test]
async fn missing_local_path_is_a_config_error() {
    let source = InputSource::LocalPath("/nonexistent/input.csv".into());
    let error = acquire(&source).await.unwrap_err();
    assert!(matches!(error, InputError::NotFound(_)));
}

#[test]
fn temp_files_carry_inferred_extension() {
    let temp = temp_file_with_extension("bucket/key/roll.csv").unwrap();
    let name = temp.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("gleaner-input-"));
    assert!(name.ends_with(".csv"));
}
