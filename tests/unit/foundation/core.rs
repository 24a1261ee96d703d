use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert_eq!(Fps::whole(24).unwrap(), Fps::new(24, 1).unwrap());
}

#[test]
fn fps_ffmpeg_arg_keeps_rational_form() {
    assert_eq!(Fps::whole(25).unwrap().to_ffmpeg_arg(), "25");
    assert_eq!(Fps::new(30000, 1001).unwrap().to_ffmpeg_arg(), "30000/1001");
}

#[test]
fn fps_parses_whole_and_rational_rates() {
    assert_eq!("24".parse::<Fps>().unwrap(), Fps::whole(24).unwrap());
    assert_eq!(
        " 30000/1001 ".parse::<Fps>().unwrap(),
        Fps::new(30000, 1001).unwrap()
    );
    assert!("0".parse::<Fps>().is_err());
    assert!("23.976".parse::<Fps>().is_err());
    assert!("24/".parse::<Fps>().is_err());
}

#[test]
fn fit_width_preserves_aspect() {
    assert_eq!(Size::new(1920, 1080).fit_width(960), Size::new(960, 540));
    assert_eq!(Size::new(100, 50).fit_width(100), Size::new(100, 50));
}

#[test]
fn fit_never_produces_zero_dimension() {
    assert_eq!(Size::new(1000, 10).fit_width(1), Size::new(1, 1));
    assert_eq!(Size::new(10, 1000).fit_height(1), Size::new(1, 1));
    assert_eq!(Size::new(1, 1).halved(), Size::new(1, 1));
    assert_eq!(Size::new(5, 3).halved(), Size::new(2, 1));
}
