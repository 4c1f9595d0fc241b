//! Integration tests for veilpix
//!
//! Covers the full hide/extract pipeline on in-memory buffers and on image
//! files, and the failure categories a caller has to tell apart.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use veilpix::crypto::{self, Envelope, EnvelopeError};
use veilpix::stego::image::{load_pixel_buffer, open, render_pixel_buffer, save};
use veilpix::stego::{self, CHANNELS};
use veilpix::{
    extract, extract_raw, hide, hide_with_rng, max_payload_len, required_bits, to_data_uri,
    OutputFormat, Payload, PixelBuffer, StegoError,
};

/// Deterministic gradient cover with an opaque alpha channel.
fn create_cover(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height) as usize * CHANNELS);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                ((x * 7 + y * 3) % 256) as u8,
                ((x * 11) % 256) as u8,
                ((y * 13) % 256) as u8,
                255,
            ]);
        }
    }
    PixelBuffer::new(width, height, data).unwrap()
}

/// The documented scenario: "hello" / "secret123" in a 64x64 opaque cover
#[test]
fn test_hello_scenario() {
    let mut cover = PixelBuffer::filled(64, 64, [255, 255, 255, 255]).unwrap();

    hide(&mut cover, b"hello", "secret123").unwrap();

    let payload = extract(&cover, "secret123").unwrap();
    assert_eq!(payload, Payload::Text("hello".to_string()));

    let wrong = extract(&cover, "wrong-pass");
    assert_eq!(wrong, Err(StegoError::Authentication));
}

/// Arbitrary bytes survive hide/extract unchanged
#[test]
fn test_binary_payload_roundtrip() {
    let mut cover = create_cover(128, 128);
    let payload: Vec<u8> = (0..600u32).map(|i| (i * 37 % 256) as u8).collect();

    hide(&mut cover, &payload, "binary-pass").unwrap();
    assert_eq!(extract_raw(&cover, "binary-pass").unwrap(), payload);
}

/// Empty payloads are valid
#[test]
fn test_empty_payload_roundtrip() {
    let mut cover = create_cover(32, 32);

    hide(&mut cover, b"", "pw").unwrap();
    assert_eq!(extract_raw(&cover, "pw").unwrap(), Vec::<u8>::new());
    assert_eq!(extract(&cover, "pw").unwrap(), Payload::Text(String::new()));
}

/// Unicode text round-trips through the byte-oriented transport
#[test]
fn test_unicode_text_roundtrip() {
    let mut cover = create_cover(64, 64);
    let message = "Contraseña: ñandú 🦀 — 秘密";

    hide(&mut cover, message.as_bytes(), "clave").unwrap();
    assert_eq!(
        extract(&cover, "clave").unwrap(),
        Payload::Text(message.to_string())
    );
}

/// Wrong password is reported as an authentication failure, never as data
#[test]
fn test_wrong_password_is_authentication_error() {
    let mut cover = create_cover(64, 64);
    hide(&mut cover, b"top secret", "k1").unwrap();

    let err = extract(&cover, "k2").unwrap_err();
    assert_eq!(err, StegoError::Authentication);
    assert!(err.is_password_problem());
}

/// Exactly `capacity` bits fit; one bit less of room fails
#[test]
fn test_capacity_boundary() {
    let payload = b"boundary payload";
    let needed = required_bits(payload.len()).unwrap();

    // One row of exactly header + message pixels
    let mut exact = PixelBuffer::filled((needed + 32) as u32, 1, [9, 9, 9, 255]).unwrap();
    assert_eq!(exact.capacity_bits(), needed);
    hide(&mut exact, payload, "pw").unwrap();
    assert_eq!(extract_raw(&exact, "pw").unwrap(), payload);

    let mut short = PixelBuffer::filled((needed + 31) as u32, 1, [9, 9, 9, 255]).unwrap();
    let before = short.clone();
    assert_eq!(
        hide(&mut short, payload, "pw"),
        Err(StegoError::CapacityExceeded {
            needed,
            capacity: needed - 1
        })
    );
    assert_eq!(short, before);
}

/// The largest advertised payload fits; one more byte does not
#[test]
fn test_max_payload_len_against_real_cover() {
    let mut cover = create_cover(50, 20);
    let max = max_payload_len(cover.capacity_bits()).unwrap();

    let mut too_big = cover.clone();
    hide(&mut cover, &vec![0x5A; max], "pw").unwrap();
    assert!(matches!(
        hide(&mut too_big, &vec![0x5A; max + 1], "pw"),
        Err(StegoError::CapacityExceeded { .. })
    ));
}

/// Hide only ever changes the red channel's least significant bit
#[test]
fn test_hide_is_non_interfering() {
    let original = create_cover(96, 96);
    let mut stego = original.clone();
    hide(&mut stego, &[0xA5; 200], "pw").unwrap();

    let changed = original
        .as_bytes()
        .chunks(CHANNELS)
        .zip(stego.as_bytes().chunks(CHANNELS))
        .filter(|(before, after)| {
            assert_eq!(before[0] >> 1, after[0] >> 1);
            assert_eq!(before[1..], after[1..]);
            before[0] != after[0]
        })
        .count();

    assert!(changed > 0);
}

/// Two encryptions of the same input differ but both decrypt
#[test]
fn test_envelope_uniqueness() {
    let first = crypto::encrypt(b"same", "same").unwrap();
    let second = crypto::encrypt(b"same", "same").unwrap();

    assert_ne!(first, second);
    assert_eq!(crypto::decrypt(&first, "same").unwrap(), b"same");
    assert_eq!(crypto::decrypt(&second, "same").unwrap(), b"same");
}

/// Flipping a ciphertext bit inside the image is caught by the tag
#[test]
fn test_tampered_stego_image_fails_authentication() {
    let mut cover = create_cover(64, 64);
    hide(&mut cover, b"integrity matters", "pw").unwrap();

    let transport = stego::extract(&cover).unwrap();
    let mut envelope = Envelope::from_transport(&transport).unwrap();
    let last = envelope.ciphertext.len() - 1;
    envelope.ciphertext[last] ^= 0x01;

    let mut tampered = cover.clone();
    stego::embed(&mut tampered, &envelope.to_transport()).unwrap();

    assert_eq!(extract(&tampered, "pw"), Err(StegoError::Authentication));
}

/// A cover that never held data fails as an image problem, not a password problem
#[test]
fn test_unused_cover_is_not_reported_as_wrong_password() {
    for rgba in [[0, 0, 0, 255], [1, 1, 1, 255], [128, 64, 32, 0]] {
        let cover = PixelBuffer::filled(40, 40, rgba).unwrap();
        let err = extract(&cover, "pw").unwrap_err();

        assert!(
            matches!(
                err,
                StegoError::TruncatedData { .. } | StegoError::MalformedEnvelope(_)
            ),
            "{rgba:?} gave {err:?}"
        );
        assert!(!err.is_password_problem());
    }
}

/// A framed message that is not base64 is a malformed envelope
#[test]
fn test_foreign_message_is_malformed() {
    let mut cover = create_cover(64, 64);
    stego::embed(&mut cover, "just some text hidden by another tool").unwrap();

    assert!(matches!(
        extract(&cover, "pw"),
        Err(StegoError::MalformedEnvelope(_))
    ));
}

/// A file payload travels as a data URI and comes back typed
#[test]
fn test_file_payload_roundtrip_with_mime() {
    let file_bytes: Vec<u8> = b"%PDF-1.4\n\x00\xFF\x10 fake document body".to_vec();
    let uri = to_data_uri(&file_bytes, "application/pdf");

    let mut cover = create_cover(128, 64);
    hide(&mut cover, uri.as_bytes(), "doc-pass").unwrap();

    match extract(&cover, "doc-pass").unwrap() {
        Payload::TypedBlob { mime, data } => {
            assert_eq!(mime, "application/pdf");
            assert_eq!(data, file_bytes);
        }
        other => panic!("expected a typed blob, got {other:?}"),
    }
}

/// Seeded randomness makes the whole pipeline reproducible
#[test]
fn test_seeded_hide_is_reproducible() {
    let mut a = create_cover(48, 48);
    let mut b = create_cover(48, 48);

    hide_with_rng(&mut ChaCha20Rng::seed_from_u64(2024), &mut a, b"fixture", "pw").unwrap();
    hide_with_rng(&mut ChaCha20Rng::seed_from_u64(2024), &mut b, b"fixture", "pw").unwrap();
    assert_eq!(a, b);

    let mut c = create_cover(48, 48);
    hide_with_rng(&mut ChaCha20Rng::seed_from_u64(2025), &mut c, b"fixture", "pw").unwrap();
    assert_ne!(a, c);
}

/// Stego images survive a PNG file round trip
#[test]
fn test_png_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let cover_path = dir.path().join("cover.png");
    let stego_path = dir.path().join("stego.png");

    save(&create_cover(80, 60), &cover_path, OutputFormat::Png).unwrap();

    let mut cover = open(&cover_path).unwrap();
    hide(&mut cover, b"written to disk", "file-pass").unwrap();
    save(&cover, &stego_path, OutputFormat::Png).unwrap();

    let reloaded = open(&stego_path).unwrap();
    assert_eq!(
        extract(&reloaded, "file-pass").unwrap(),
        Payload::Text("written to disk".to_string())
    );
}

/// Stego images survive an in-memory BMP round trip
#[test]
fn test_bmp_bytes_roundtrip() {
    let mut cover = create_cover(64, 48);
    hide(&mut cover, b"bitmap", "pw").unwrap();

    let bmp = render_pixel_buffer(&cover, OutputFormat::Bmp).unwrap();
    let reloaded = load_pixel_buffer(&bmp).unwrap();

    assert_eq!(extract_raw(&reloaded, "pw").unwrap(), b"bitmap");
}

/// Envelope errors keep their category through the public API
#[test]
fn test_envelope_error_categories() {
    assert!(matches!(
        crypto::decrypt("%%%", "pw"),
        Err(EnvelopeError::MalformedEnvelope(_))
    ));

    let transport = crypto::encrypt(b"x", "right").unwrap();
    assert_eq!(
        crypto::decrypt(&transport, "left"),
        Err(EnvelopeError::AuthenticationFailed)
    );
}
