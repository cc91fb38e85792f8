use std::io::Cursor;

use glam::{Quat, Vec3};
use ossein_graphics_core::{
    Animation, BinaryWriter, FormatError, SkeletonAnimation, TransformSpace, TransformType,
    Translator, TranslatorIo,
};
use ossein_seanim::{SeAnimTranslator, HEADER_SIZE, MAGIC, VERSION};

fn sample_animation() -> Animation {
    let mut animation = Animation::new("walk");
    animation.framerate = 24.0;

    let mut sa = SkeletonAnimation::new(None);
    sa.transform_type = TransformType::Additive;

    let spine = sa.create_target("spine");
    spine.add_translation_frame(0.0, Vec3::new(1.0, 2.0, 3.0));
    spine.add_translation_frame(10.0, Vec3::new(4.0, 5.0, 6.0));
    spine.add_rotation_frame(0.0, Quat::IDENTITY);
    spine.add_rotation_frame(10.0, Quat::from_rotation_y(0.5));

    let head = sa.create_target("head.top");
    head.transform_type = TransformType::Relative;
    head.add_scale_frame(5.0, Vec3::new(2.0, 2.0, 2.0));

    animation.skeleton_animation = Some(sa);
    animation.create_action("footstep").frames.extend([2.0, 8.0]);
    animation.create_action("flash").frames.push(5.0);
    animation
}

fn write_bytes(animation: Animation, scale: f32) -> Vec<u8> {
    let mut io = TranslatorIo::with_scale(scale);
    io.animations.push(animation);
    let mut buf = Vec::new();
    SeAnimTranslator
        .write(&mut buf, &io)
        .expect("write succeeds");
    buf
}

fn read_bytes(bytes: &[u8]) -> Result<Animation, FormatError> {
    let mut io = TranslatorIo::new();
    io.name_hint = Some("walk".to_string());
    SeAnimTranslator
        .read(&mut Cursor::new(bytes), &mut io)
        .map(|_| io.animations.remove(0))
}

#[test]
fn round_trips_channels_modifiers_and_actions() {
    let bytes = write_bytes(sample_animation(), 1.0);
    let parsed = read_bytes(&bytes).expect("read succeeds");

    assert_eq!(parsed.name, "walk");
    assert_eq!(parsed.framerate, 24.0);
    assert_eq!(parsed.frame_count(), 11.0);

    let sa = parsed.skeleton_animation.as_ref().expect("skeletal data");
    assert_eq!(sa.transform_type, TransformType::Additive);
    assert_eq!(sa.transform_space, TransformSpace::Local);
    assert_eq!(sa.targets.len(), 2);

    let spine = &sa.targets[sa.target_index("spine").unwrap()];
    let translations = spine.translation_frames.as_ref().unwrap();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations[1].time, 10.0);
    assert!(translations[1].value.abs_diff_eq(Vec3::new(4.0, 5.0, 6.0), 1e-6));
    let rotations = spine.rotation_frames.as_ref().unwrap();
    assert!(rotations[1].value.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));

    // Dots in bone names degrade to underscores on disk.
    let head = &sa.targets[sa.target_index("head_top").unwrap()];
    assert_eq!(head.transform_type, TransformType::Relative);
    let scales = head.scale_frames.as_ref().unwrap();
    assert_eq!(scales[0].time, 5.0);
    assert!(scales[0].value.abs_diff_eq(Vec3::splat(2.0), 1e-6));

    assert_eq!(parsed.action("footstep").unwrap().frames, vec![2.0, 8.0]);
    assert_eq!(parsed.action("flash").unwrap().frames, vec![5.0]);
    assert_eq!(parsed.action_count(), 3);
}

#[test]
fn write_then_read_is_idempotent() {
    let first = read_bytes(&write_bytes(sample_animation(), 1.0)).unwrap();
    let second = read_bytes(&write_bytes(first.clone(), 1.0)).unwrap();

    let sa1 = first.skeleton_animation.as_ref().unwrap();
    let sa2 = second.skeleton_animation.as_ref().unwrap();
    assert_eq!(sa1.targets.len(), sa2.targets.len());
    for (a, b) in sa1.targets.iter().zip(&sa2.targets) {
        assert_eq!(a.bone_name, b.bone_name);
        assert_eq!(a.transform_type, b.transform_type);
        assert_eq!(a.translation_frames, b.translation_frames);
        assert_eq!(a.rotation_frames, b.rotation_frames);
        assert_eq!(a.scale_frames, b.scale_frames);
    }
    assert_eq!(first.actions.len(), second.actions.len());
}

#[test]
fn scale_factor_applies_to_translations_only() {
    let parsed = read_bytes(&write_bytes(sample_animation(), 2.0)).unwrap();
    let sa = parsed.skeleton_animation.as_ref().unwrap();
    let spine = &sa.targets[sa.target_index("spine").unwrap()];
    let translations = spine.translation_frames.as_ref().unwrap();
    assert!(translations[0].value.abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-6));
    let head = &sa.targets[sa.target_index("head_top").unwrap()];
    assert!(head.scale_frames.as_ref().unwrap()[0]
        .value
        .abs_diff_eq(Vec3::splat(2.0), 1e-6));
}

#[test]
fn high_precision_files_narrow_to_f32() {
    let mut buf = Vec::new();
    let mut writer = BinaryWriter::new(&mut buf);
    writer.write_bytes(&MAGIC).unwrap();
    writer.write_u16(VERSION).unwrap();
    writer.write_u16(HEADER_SIZE).unwrap();
    writer.write_u8(0).unwrap(); // absolute
    writer.write_u8(0).unwrap();
    writer.write_u8(1).unwrap(); // translation only
    writer.write_u8(1).unwrap(); // high precision values
    writer.write_u16(0).unwrap();
    writer.write_f32(30.0).unwrap();
    writer.write_i32(2).unwrap(); // frames
    writer.write_i32(1).unwrap(); // bones
    writer.write_u8(0).unwrap(); // modifiers
    writer.write_u8(0).unwrap();
    writer.write_u16(0).unwrap();
    writer.write_i32(0).unwrap(); // actions
    writer.write_cstring("root").unwrap();
    writer.write_u8(0).unwrap(); // bone reserved
    writer.write_u8(1).unwrap(); // one key
    writer.write_u8(1).unwrap(); // at frame 1
    writer.write_f64(1.5).unwrap();
    writer.write_f64(-2.25).unwrap();
    writer.write_f64(0.125).unwrap();

    let parsed = read_bytes(&buf).unwrap();
    let sa = parsed.skeleton_animation.as_ref().unwrap();
    let frames = sa.targets[0].translation_frames.as_ref().unwrap();
    assert_eq!(frames[0].time, 1.0);
    assert!(frames[0].value.abs_diff_eq(Vec3::new(1.5, -2.25, 0.125), 1e-6));
}

#[test]
fn too_many_modifiers_exceed_capacity() {
    let mut animation = Animation::new("crowd");
    let mut sa = SkeletonAnimation::new(None);
    sa.transform_type = TransformType::Absolute;
    for i in 0..300 {
        let target = sa.create_target(&format!("bone_{i}"));
        target.transform_type = TransformType::Additive;
        target.add_translation_frame(0.0, Vec3::ZERO);
    }
    animation.skeleton_animation = Some(sa);

    let mut io = TranslatorIo::new();
    io.animations.push(animation);
    let mut buf = Vec::new();
    assert!(matches!(
        SeAnimTranslator.write(&mut buf, &io),
        Err(FormatError::CapacityExceeded { count: 300 })
    ));
}

#[test]
fn key_counts_past_the_frame_index_width_exceed_capacity() {
    let mut animation = Animation::new("jitter");
    let mut sa = SkeletonAnimation::new(None);
    let target = sa.create_target("root");
    // 300 keys crammed into a single frame: the frame count picks a one-byte
    // width the key count cannot fit.
    for _ in 0..300 {
        target.add_translation_frame(0.0, Vec3::ZERO);
    }
    animation.skeleton_animation = Some(sa);

    let mut io = TranslatorIo::new();
    io.animations.push(animation);
    let mut buf = Vec::new();
    assert!(matches!(
        SeAnimTranslator.write(&mut buf, &io),
        Err(FormatError::CapacityExceeded { count: 300 })
    ));
}

#[test]
fn action_only_animations_round_trip() {
    let mut animation = Animation::new("cues");
    animation.create_action("start").frames.push(0.0);
    animation.create_action("stop").frames.push(30.0);

    let parsed = read_bytes(&write_bytes(animation, 1.0)).unwrap();
    assert_eq!(parsed.action_count(), 2);
    assert_eq!(parsed.action("stop").unwrap().frames, vec![30.0]);
    assert_eq!(parsed.frame_count(), 31.0);
}

#[test]
fn header_corruption_is_rejected() {
    let bytes = write_bytes(sample_animation(), 1.0);

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        read_bytes(&bad_magic),
        Err(FormatError::InvalidMagic { .. })
    ));

    let mut bad_version = bytes.clone();
    bad_version[6] = 3;
    assert!(matches!(
        read_bytes(&bad_version),
        Err(FormatError::InvalidVersion { found: 3, .. })
    ));

    let mut bad_header = bytes.clone();
    bad_header[8] = 0x1D;
    assert!(matches!(
        read_bytes(&bad_header),
        Err(FormatError::InvalidHeaderSize { .. })
    ));

    let mut bad_type = bytes;
    bad_type[10] = 7;
    assert!(matches!(
        read_bytes(&bad_type),
        Err(FormatError::UnknownTransformType { found: 7 })
    ));
}

#[test]
fn truncated_streams_are_rejected() {
    let bytes = write_bytes(sample_animation(), 1.0);
    let cut = &bytes[..bytes.len() / 2];
    assert!(matches!(read_bytes(cut), Err(FormatError::Truncated)));
}

#[test]
fn sniffing_matches_the_magic() {
    let translator = SeAnimTranslator;
    assert!(translator.is_valid(b"SEAnim\x01\x00", None));
    assert!(!translator.is_valid(b"SEModel", Some(".seanim")));
}
