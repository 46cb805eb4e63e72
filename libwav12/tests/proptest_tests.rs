//! Property tests for the wav12 codec

use libwav12::{
    linear_compress, linear_expand, ChunkStream, Decoder, Encoder, Expander, Format, SliceSource,
};
use proptest::prelude::*;

prop_compose! {
    /// a random walk, closer to audio than uniform noise
    fn arb_walk()(
        start in any::<i16>(),
        steps in prop::collection::vec(-3000i32..3000, 0..2000),
    ) -> Vec<i16> {
        let mut value = start as i32;
        steps
            .into_iter()
            .map(|step| {
                value = (value + step).clamp(i16::MIN as i32, i16::MAX as i32);
                value as i16
            })
            .collect()
    }
}

proptest! {
    /// Property: expanding a compressed buffer returns the input with the low bits cleared
    #[test]
    fn prop_linear_matches_quantized_input(
        samples in prop::collection::vec(any::<i16>(), 0..1500),
        shift in 0u8..=4,
    ) {
        let packed = linear_compress(&samples, shift, None).unwrap();
        prop_assert!(packed.len() <= samples.len() * 4);

        let mut out = vec![0i16; samples.len()];
        linear_expand(&packed, &mut out, shift).unwrap();
        let expected: Vec<i16> = samples.iter().map(|&s| (s >> shift) << shift).collect();
        prop_assert_eq!(out, expected);
    }

    /// Property: lossless assets decode to exactly the input whatever format is chosen
    #[test]
    fn prop_lossless_asset(samples in arb_walk()) {
        let asset = Encoder::new().encode(&samples).unwrap();
        prop_assert_eq!(Decoder::new().decode(&asset).unwrap(), samples);
    }

    /// Property: how the output is split and how the input is chunked never changes the result
    #[test]
    fn prop_chunking_invariance(
        samples in arb_walk(),
        call_size in 1usize..200,
        shift in 0u8..=4,
    ) {
        let packed = linear_compress(&samples, shift, None).unwrap();
        let mut whole = vec![0i16; samples.len()];
        linear_expand(&packed, &mut whole, shift).unwrap();

        let stream: ChunkStream<_, 13> = ChunkStream::new(SliceSource::new(&packed), packed.len());
        let mut expander = Expander::new(stream, samples.len(), Format::Linear, shift).unwrap();
        let mut pieces = vec![0i16; samples.len()];
        for chunk in pieces.chunks_mut(call_size) {
            expander.expand(chunk).unwrap();
        }
        prop_assert!(expander.done());
        prop_assert_eq!(pieces, whole);
    }
}
