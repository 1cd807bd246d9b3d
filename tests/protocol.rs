use keystore_mac::{
    DigestAlgorithm, HmacAlgorithm, MacData, MacError, PBMAC1_LABEL, PbeParams, compute_mac,
    verify_mac, verify_mac_with,
};

const PASSWORD: &str = "changeit";
const ALGORITHM: &str = "PBEWithHmacSHA256AndHmacSHA256";

fn payload() -> Vec<u8> {
    vec![0xAB; 100]
}

#[test]
fn pbmac1_scenario() {
    let salt = [0u8; 16];
    let encoded = compute_mac(PASSWORD, &payload(), true, ALGORITHM, 1000, &salt).unwrap();

    let record = MacData::from_der(&encoded).unwrap();
    assert!(record.is_pbmac1());
    assert_eq!(record.digest().len(), 32);
    assert_eq!(record.kdf_hmac(), Some(HmacAlgorithm::Sha256));
    assert_eq!(record.verify_hmac(), Some(HmacAlgorithm::Sha256));
    assert_eq!(record.kdf_hmac().unwrap().name(), "HmacSHA256");
    assert_eq!(record.iterations(), 1000);
    assert_eq!(record.salt(), &salt);
    assert_eq!(record.mac_algorithm(), ALGORITHM);

    verify_mac_with(&record, PASSWORD, &payload(), ALGORITHM).unwrap();

    let mut tampered = payload();
    *tampered.last_mut().unwrap() = 0xAC;
    assert!(matches!(
        verify_mac_with(&record, PASSWORD, &tampered, ALGORITHM),
        Err(MacError::IntegrityCheckFailed)
    ));
}

#[test]
fn encoding_is_stable_across_decode() {
    let encoded = compute_mac(PASSWORD, &payload(), true, ALGORITHM, 1000, &[0u8; 16]).unwrap();
    let record = MacData::from_der(&encoded).unwrap();
    assert_eq!(record.encode().unwrap(), encoded);
    assert_eq!(record.encode().unwrap(), encoded);
}

#[test]
fn verification_symmetry_for_every_algorithm() {
    let mut specs: Vec<String> = HmacAlgorithm::ALL
        .iter()
        .map(|h| format!("PBEWith{h}And{h}"))
        .collect();
    specs.extend(
        DigestAlgorithm::ALL
            .iter()
            .map(|d| format!("HmacPBE{}", d.name().replace('-', ""))),
    );

    for spec in specs {
        let encoded = compute_mac(PASSWORD, b"content", true, &spec, 3, &[7u8; 20]).unwrap();
        let record = MacData::from_der(&encoded).unwrap();
        verify_mac_with(&record, PASSWORD, b"content", &spec)
            .unwrap_or_else(|e| panic!("{spec}: {e}"));
        verify_mac(&record, PASSWORD, b"content").unwrap();
    }
}

#[test]
fn any_single_byte_change_is_detected() {
    let data = b"0123456789abcdef".to_vec();
    let encoded = compute_mac(PASSWORD, &data, true, ALGORITHM, 2, &[1u8; 16]).unwrap();
    let record = MacData::from_der(&encoded).unwrap();

    for i in 0..data.len() {
        let mut tampered = data.clone();
        tampered[i] ^= 0x01;
        assert!(matches!(
            verify_mac(&record, PASSWORD, &tampered),
            Err(MacError::IntegrityCheckFailed)
        ));
    }
}

#[test]
fn tampered_digest_is_detected() {
    let encoded = compute_mac(PASSWORD, b"data", true, "HmacPBESHA1", 2, &[1u8; 20]).unwrap();
    let record = MacData::from_der(&encoded).unwrap();

    for i in 0..record.digest().len() {
        let mut digest = record.digest().to_vec();
        digest[i] ^= 0x80;
        let forged = MacData::legacy(
            DigestAlgorithm::Sha1,
            digest,
            PbeParams::new(record.salt(), record.iterations()),
        )
        .unwrap();
        assert!(matches!(
            verify_mac(&forged, PASSWORD, b"data"),
            Err(MacError::IntegrityCheckFailed)
        ));
    }
}

#[test]
fn constructed_records_round_trip() {
    let legacy = MacData::new(
        "SHA-384",
        vec![0x5A; 48],
        PbeParams::new(vec![1, 2, 3, 4, 5, 6, 7, 8], 2048),
        None,
        None,
        None,
    )
    .unwrap();
    let pbmac1 = MacData::new(
        PBMAC1_LABEL,
        vec![0xA5; 64],
        PbeParams::new(vec![9u8; 32], 600_000),
        Some("HmacSHA512"),
        Some("HmacSHA512"),
        Some(512),
    )
    .unwrap();

    for record in [legacy, pbmac1] {
        let bytes = record.encode().unwrap();
        let parsed = MacData::from_der(&bytes).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.mac_algorithm(), record.mac_algorithm());
        assert_eq!(parsed.encode().unwrap(), bytes);
    }
}

#[test]
fn concurrent_encoding_agrees() {
    let record = MacData::new(
        PBMAC1_LABEL,
        vec![1u8; 32],
        PbeParams::new(vec![2u8; 16], 10),
        Some("HmacSHA256"),
        Some("HmacSHA256"),
        Some(256),
    )
    .unwrap();

    let encodings: Vec<Vec<u8>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| record.encode().unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(encodings.windows(2).all(|w| w[0] == w[1]));
}
