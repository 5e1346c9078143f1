use super::*;

#[test]
fn raw_base64_gets_png_prefix() {
    assert_eq!(
        normalize_image_payload("iVBORw0KGgo="),
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[test]
fn normalization_is_idempotent() {
    for value in [
        "iVBORw0KGgo=",
        "data:image/jpeg;base64,/9j/4AAQ",
        "  data:image/png;base64,QUJD",
    ] {
        let once = normalize_image_payload(value);
        assert_eq!(normalize_image_payload(&once), once, "value {value:?}");
    }
    assert_eq!(
        normalize_image_payload("data:image/jpeg;base64,/9j/4AAQ"),
        "data:image/jpeg;base64,/9j/4AAQ"
    );
    assert_eq!(normalize_image_payload(""), "");
}

#[test]
fn decodes_raw_and_prefixed_payloads() {
    let raw = decode_image_payload("QUJD").expect("raw base64");
    assert_eq!(raw.media_type, "image/png");
    assert_eq!(raw.bytes, b"ABC");

    let jpeg = decode_image_payload("data:image/jpeg;base64,QU\nJD").expect("data uri");
    assert_eq!(jpeg.media_type, "image/jpeg");
    assert_eq!(jpeg.bytes, b"ABC");
}

#[test]
fn rejects_non_base64_data_uri() {
    assert!(matches!(
        decode_image_payload("data:text/plain,hello"),
        Err(MediaError::MalformedDataUri)
    ));
    assert!(matches!(
        decode_image_payload("not base64!"),
        Err(MediaError::Base64(_))
    ));
    assert!(matches!(
        decode_image_payload(""),
        Err(MediaError::MalformedDataUri)
    ));
}

#[test]
fn only_image_media_types_are_accepted() {
    let png = SelectedFile::new("cat.png", "image/png", vec![1, 2, 3]);
    let image = UploadedImage::decode(png).expect("png accepted");
    assert_eq!(image.preview(), "data:image/png;base64,AQID");
    assert_eq!(image.file_name(), "cat.png");

    assert!(UploadedImage::decode(SelectedFile::new("IMG.HEIC", "Image/HEIC", vec![0])).is_some());
    assert!(UploadedImage::decode(SelectedFile::new("a.pdf", "application/pdf", vec![0])).is_none());
    assert!(UploadedImage::decode(SelectedFile::new("blob", "", vec![0])).is_none());
}

#[test]
fn download_names() {
    assert_eq!(result_file_name("Oil Painting"), "dreamink-oil-painting.png");
    assert_eq!(result_file_name("Studio  Ghibli"), "dreamink-studio-ghibli.png");
    assert_eq!(result_file_name("Pixar"), "dreamink-pixar.png");
    assert_eq!(
        history_file_name("oil", HistoryId(42)),
        "ai-transform-oil-42.png"
    );
}

#[tokio::test]
async fn reads_file_and_guesses_media_type() {
    let dir = std::env::temp_dir().join(format!("dreamink-media-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("temp dir");
    let path = dir.join("portrait.jpg");
    tokio::fs::write(&path, b"\xFF\xD8\xFF").await.expect("write");

    let file = SelectedFile::from_path(&path).await.expect("read file");
    assert_eq!(file.file_name, "portrait.jpg");
    assert_eq!(file.media_type, "image/jpeg");
    assert!(file.is_image());

    let missing = SelectedFile::from_path(&dir.join("missing.png")).await;
    assert!(matches!(missing, Err(MediaError::Read { .. })));
    let _ = tokio::fs::remove_dir_all(&dir).await;
}
