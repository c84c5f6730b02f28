use super::*;

#[test]
fn explicit_missing_font_is_an_error() {
    let missing = Path::new("/definitely/not/here/NotoSansCJKjp-Regular.otf");
    assert!(matches!(
        FontFace::resolve(Some(missing)),
        Err(CardError::Font(_))
    ));
}

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(FontFace::from_bytes(Vec::new(), 0, "empty").is_err());
}

#[test]
fn font_bytes_are_shared_on_clone() {
    let face = FontFace::from_bytes(vec![0u8; 16], 2, "mem").unwrap();
    let other = face.clone();
    assert!(Arc::ptr_eq(face.bytes(), other.bytes()));
    assert_eq!(other.index(), 2);
    assert_eq!(other.origin(), "mem");
}
