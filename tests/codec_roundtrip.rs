use protocodec_rs::codec::transforms;
use protocodec_rs::phy::bits::{bits_to_string, bits_to_u64, bytes_to_bits, parse_bits};
use protocodec_rs::phy::line_coding;
use protocodec_rs::utils::consts::*;
use protocodec_rs::{Chain, Codec, Crc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bits(rng: &mut StdRng, len: usize) -> Vec<bool> {
    (0..len).map(|_| rng.random_bool(0.5)).collect()
}

fn bits(text: &str) -> Vec<bool> {
    parse_bits(text).expect("test bit strings are valid")
}

#[test]
fn single_stage_round_trips_on_random_messages() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let len = rng.random_range(1..96);
        let data = random_bits(&mut rng, len);

        let inverted = transforms::invert(&data);
        assert_eq!(transforms::invert(&inverted.bits).bits, data);

        let differential = line_coding::differential(false, &data);
        assert_eq!(line_coding::differential(true, &differential.bits).bits, data);

        let edge = line_coding::edge(false, &data);
        let decoded = line_coding::edge(true, &edge.bits);
        assert_eq!(decoded.bits, data);
        assert_eq!(decoded.errors, 0);

        let multiple = rng.random_range(2..6);
        let redundant = transforms::redundancy(false, &data, multiple);
        assert_eq!(redundant.bits.len(), data.len() * multiple);
        let decoded = transforms::redundancy(true, &redundant.bits, multiple);
        assert_eq!(decoded.bits, data);
        assert_eq!(decoded.errors, 0);
    }
}

#[test]
fn long_chain_decodes_what_it_encoded() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut codec = Codec::from_tokens(&[
        "Kitchen sink",
        DECODING_INVERT,
        DECODING_DIFFERENTIAL,
        DECODING_REDUNDANCY,
        "3",
        DECODING_CARRIER,
        "10",
        DECODING_BITORDER,
        DECODING_EDGE,
        DECODING_SUBSTITUTION,
        "01:1;10:0;",
    ])
    .expect("chain tokens are valid");

    for _ in 0..50 {
        let data = random_bits(&mut rng, 16);
        let encoded = codec.process(false, &data);
        assert_eq!(encoded.errors, 0);
        assert!(codec.symbol_len() > 1);

        let decoded = codec.process(true, &encoded.bits);
        assert_eq!(decoded.bits, data);
        assert_eq!(decoded.errors, 0);
    }
}

#[test]
fn chain_tokens_survive_a_round_trip() {
    let chain = Chain::from_tokens(&["name", DECODING_REDUNDANCY]).expect("valid chain");
    assert_eq!(chain.to_tokens(), vec!["name", DECODING_REDUNDANCY, "2"]);

    let rebuilt = Chain::from_tokens(&chain.to_tokens()).expect("valid chain");
    assert_eq!(rebuilt, chain);
}

#[test]
fn whitened_frame_decodes_with_zero_crc_residual() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut codec = Codec::from_tokens(&["CC1101", DECODING_DATAWHITENING]).expect("valid chain");

    for len in [8, 33, 64] {
        let mut frame = random_bits(&mut rng, len);
        frame.extend(std::iter::repeat_n(false, 16));

        let encoded = codec.process(false, &frame);
        assert_eq!(encoded.errors, 0);

        let decoded = codec.process(true, &encoded.bits);
        assert_eq!(decoded.errors, 0);
        assert_eq!(decoded.bits, frame);
        assert!(decoded.bits[len..].iter().all(|&b| !b));
    }
}

#[test]
fn crc_matches_reference_check_value() {
    let message = bytes_to_bits(b"123456789");
    let crc = Crc::from_name("16_ccitt", true).expect("known polynomial");

    let first = crc.compute(&message);
    assert_eq!(first, crc.compute(&message));
    assert_eq!(bits_to_u64(&first), 0x29B1);
    assert!(crc.verify(&message, &first));
}

#[test]
fn carrier_wraps_every_bit() {
    let mut codec = Codec::from_tokens(&["carrier", DECODING_CARRIER, "1"]).expect("valid chain");
    let encoded = codec.encode(&bits("10"));
    assert_eq!(bits_to_string(&encoded), "11101");
    assert_eq!(codec.decode(&encoded), bits("10"));
}

#[test]
fn ambiguous_substitution_window_counts_an_error() {
    let mut codec = Codec::from_tokens(&["sub", DECODING_SUBSTITUTION, "01:1;10:0;00:1;00:0;"])
        .expect("valid chain");
    let out = codec.process(true, &bits("0100101"));
    assert_eq!(bits_to_string(&out.bits), "111");
    assert_eq!(out.errors, 1);
}
