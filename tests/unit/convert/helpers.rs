use super::*;

#[test]
fn sibling_keeps_directory_and_extension() {
    assert_eq!(
        sibling_with_suffix(Path::new("/a/b/photo.jpg"), "_half").unwrap(),
        PathBuf::from("/a/b/photo_half.jpg")
    );
    assert_eq!(
        sibling_with_suffix(Path::new("clip.mov"), "_resized_640px").unwrap(),
        PathBuf::from("./clip_resized_640px.mov")
    );
}

#[test]
fn stem_requires_a_name() {
    assert!(stem_of(Path::new("/")).is_err());
    assert_eq!(stem_of(Path::new("x/frame.0001.exr")).unwrap(), "frame.0001");
}
