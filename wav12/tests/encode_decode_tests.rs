#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use libwav12::image::DIRECTORY_SIZE;
    use libwav12::{AssetHeader, Format, MemImage, Reader};
    use wav12::audio::{read_wav_file, write_wav};
    use wav12::manifest::{DirEntry, FileEntry, Manifest};
    use wav12::{
        build_image, decode_asset_streaming, decode_to_wav, encode_file, get_asset_info,
        EncodeOptions,
    };

    fn tone(len: usize, step: f32) -> Vec<i16> {
        (0..len)
            .map(|i| ((i as f32 * step).sin() * 12000.0) as i16)
            .collect()
    }

    fn write_tone(path: &Path, len: usize, step: f32) -> Vec<i16> {
        let samples = tone(len, step);
        write_wav(path, &samples, 22050).unwrap();
        samples
    }

    #[test]
    fn test_wav_to_asset_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        let samples = write_tone(&wav, 22050, 0.03);

        let (asset, stats) = encode_file(&wav, &EncodeOptions::lossless()).unwrap();
        assert_eq!(stats.total(), 22050);
        let info = get_asset_info(&asset).unwrap();
        assert_eq!(info.format, "linear");
        assert!((info.duration_secs - 1.0).abs() < 1e-9);

        let asset_path = dir.path().join("tone.w12");
        fs::write(&asset_path, &asset).unwrap();

        // chunk sizes that do and do not divide the length
        for chunk in [1, 17, 512, 100_000] {
            assert_eq!(decode_asset_streaming(&asset_path, chunk).unwrap(), samples);
        }

        let wav_bytes = decode_to_wav(&asset_path, 256).unwrap();
        let out_wav = dir.path().join("out.wav");
        fs::write(&out_wav, wav_bytes).unwrap();
        assert_eq!(read_wav_file(&out_wav).unwrap().samples, samples);
    }

    #[test]
    fn test_lossy_shift() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        let samples = write_tone(&wav, 5000, 0.1);

        let options = EncodeOptions::lossless().with_shift(3).force_linear();
        let (asset, _) = encode_file(&wav, &options).unwrap();
        let asset_path = dir.path().join("tone.w12");
        fs::write(&asset_path, &asset).unwrap();

        let decoded = decode_asset_streaming(&asset_path, 64).unwrap();
        let expected: Vec<i16> = samples.iter().map(|&s| (s >> 3) << 3).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_rejects_wrong_layout() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("fast.wav");
        write_wav(&wav, &tone(100, 0.1), 44100).unwrap();
        assert!(encode_file(&wav, &EncodeOptions::lossless()).is_err());

        let good = dir.path().join("good.wav");
        write_tone(&good, 100, 0.1);
        assert!(encode_file(&good, &EncodeOptions::lossless().with_shift(5)).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_asset() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        write_tone(&wav, 3000, 0.05);
        let (asset, _) = encode_file(&wav, &EncodeOptions::lossless()).unwrap();

        let cut = dir.path().join("cut.w12");
        fs::write(&cut, &asset[..asset.len() / 2]).unwrap();
        assert!(decode_asset_streaming(&cut, 100).is_err());

        let header_only = dir.path().join("header.w12");
        fs::write(&header_only, &asset[..8]).unwrap();
        assert!(decode_asset_streaming(&header_only, 100).is_err());
    }

    #[test]
    fn test_decode_rejects_inflated_header() {
        let dir = tempfile::tempdir().unwrap();

        // one payload byte claiming a billion samples
        let mut bogus = AssetHeader::new(0x4000_0000, 1, Format::Linear, 0).to_bytes().to_vec();
        bogus.push(0);
        let path = dir.path().join("bogus.w12");
        fs::write(&path, &bogus).unwrap();
        assert!(decode_asset_streaming(&path, 512).is_err());
        assert!(decode_to_wav(&path, 512).is_err());

        // consistent header, payload missing from the file
        let claimed = AssetHeader::new(u32::MAX / 2, u32::MAX, Format::Linear, 0);
        let path = dir.path().join("claimed.w12");
        fs::write(&path, claimed.to_bytes()).unwrap();
        let err = decode_asset_streaming(&path, 512).unwrap_err();
        assert!(err.to_string().contains("payload bytes"));
    }

    #[test]
    fn test_build_image_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("hum")).unwrap();
        fs::create_dir(dir.path().join("fx")).unwrap();
        let hum = write_tone(&dir.path().join("hum/loop.wav"), 4000, 0.02);
        write_tone(&dir.path().join("hum/idle.wav"), 2000, 0.04);
        let clash = write_tone(&dir.path().join("fx/clash.wav"), 1000, 0.3);

        let manifest = Manifest {
            dirs: vec![
                DirEntry {
                    path: "hum".to_string(),
                    files: vec![
                        FileEntry {
                            path: "loop.wav".to_string(),
                            shift: Some(2),
                            compress: None,
                        },
                        FileEntry {
                            path: "idle.wav".to_string(),
                            shift: None,
                            compress: None,
                        },
                    ],
                },
                DirEntry {
                    path: "fx".to_string(),
                    files: vec![FileEntry {
                        path: "clash.wav".to_string(),
                        shift: Some(1),
                        compress: Some(false),
                    }],
                },
            ],
        };
        let manifest_path = dir.path().join("image.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();

        let built = build_image(&manifest_path).unwrap();
        assert!(built.bytes.len() > DIRECTORY_SIZE);
        assert!(built.listing.contains("hum/ (2 files)"));
        assert!(built.listing.contains("fx/ (1 files)"));

        let image = MemImage::parse(&built.bytes).unwrap();
        let reader = Reader::new();

        let looped = reader.read(image.find("hum", "loop").unwrap()).unwrap();
        assert_eq!(looped.header.shift_bits, 2);
        let mut out = vec![0i16; hum.len()];
        looped.expander().unwrap().expand(&mut out).unwrap();
        let expected: Vec<i16> = hum.iter().map(|&s| (s >> 2) << 2).collect();
        assert_eq!(out, expected);

        // forced raw drops the shift
        let raw = reader.read(image.find("fx", "clash").unwrap()).unwrap();
        assert_eq!(raw.header.format, Format::Raw);
        assert_eq!(raw.header.shift_bits, 0);
        let mut out = vec![0i16; clash.len()];
        raw.expander().unwrap().expand(&mut out).unwrap();
        assert_eq!(out, clash);
    }

    #[test]
    fn test_image_missing_wav() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("image.json");
        fs::write(
            &manifest_path,
            r#"{ "dirs": [ { "path": "a", "files": [ { "path": "nope.wav" } ] } ] }"#,
        )
        .unwrap();
        assert!(build_image(&manifest_path).is_err());
    }
}
