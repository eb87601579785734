//! SNMPv3 security benchmarks.
//!
//! Key derivation runs once per user and engine; HMAC and the privacy
//! transforms run on every message.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snmp_wire::v3::{
    AuthProtocol, EngineRecord, LocalizedKey, PrivKey, PrivProtocol, SecurityLevel,
    SecurityParameters,
};
use snmp_wire::{Codec, Oid, PduType, V3Pdu, VarBindList};
use std::hint::black_box;
use std::sync::Arc;

const ENGINE_ID: &[u8] = b"\x80\x00\x1f\x88\x80\xe9\xb1\x04\x61\x73\x61\x00\x00\x00";
const PASSWORD: &[u8] = b"maplesyrup";

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("v3_key_derivation");
    // 1 MB of hashing per key
    group.sample_size(10);

    for protocol in [AuthProtocol::Md5, AuthProtocol::Sha1, AuthProtocol::Sha256] {
        group.bench_function(BenchmarkId::new("from_password", protocol), |b| {
            b.iter(|| black_box(LocalizedKey::from_password(protocol, PASSWORD, ENGINE_ID)))
        });
    }

    group.finish();
}

fn bench_hmac(c: &mut Criterion) {
    let mut group = c.benchmark_group("v3_hmac");

    for protocol in [AuthProtocol::Md5, AuthProtocol::Sha1, AuthProtocol::Sha512] {
        let key = LocalizedKey::from_password(protocol, PASSWORD, ENGINE_ID);
        for size in [128usize, 512, 1024] {
            let data = vec![0xABu8; size];
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("compute_{}", protocol), size),
                &data,
                |b, data| b.iter(|| black_box(key.compute_hmac(&[data.as_slice()]).unwrap())),
            );
        }
    }

    group.finish();
}

fn bench_privacy(c: &mut Criterion) {
    let mut group = c.benchmark_group("v3_privacy");
    let auth = LocalizedKey::from_password(AuthProtocol::Sha256, PASSWORD, ENGINE_ID);
    let plaintext = vec![0xABu8; 256];
    group.throughput(Throughput::Bytes(256));

    for protocol in [PrivProtocol::Des, PrivProtocol::Aes128, PrivProtocol::Aes256] {
        let key = PrivKey::from_localized(&auth, protocol);
        group.bench_function(BenchmarkId::new("encrypt", protocol), |b| {
            b.iter(|| black_box(key.encrypt(&plaintext, 100, 12345, 7).unwrap()))
        });

        let (ciphertext, priv_params) = key.encrypt(&plaintext, 100, 12345, 7).unwrap();
        group.bench_function(BenchmarkId::new("decrypt", protocol), |b| {
            b.iter(|| {
                black_box(
                    key.decrypt(&ciphertext, 100, 12345, &priv_params)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

/// Whole-message cost per security level: localize, encrypt, sign, and back.
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("v3_codec");
    group.sample_size(20);

    let users = [
        (SecurityLevel::NoAuthNoPriv, SecurityParameters::new("bench").unwrap()),
        (
            SecurityLevel::AuthNoPriv,
            SecurityParameters::new("bench")
                .unwrap()
                .with_auth(AuthProtocol::Sha256, PASSWORD)
                .unwrap(),
        ),
        (
            SecurityLevel::AuthPriv,
            SecurityParameters::new("bench")
                .unwrap()
                .with_auth(AuthProtocol::Sha256, PASSWORD)
                .unwrap()
                .with_privacy(PrivProtocol::Aes128, PASSWORD)
                .unwrap(),
        ),
    ];

    for (level, user) in users {
        let user = Arc::new(user);
        let codec = Codec::default();
        let mut pdu = V3Pdu::new(PduType::GetRequest, Arc::clone(&user));
        pdu.set_request_id(1);
        pdu.set_engine(Some(EngineRecord::new(ENGINE_ID, 1, 1000).unwrap()));
        pdu.set_varbinds(
            VarBindList::from_oids(&[Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0])]).unwrap(),
        );
        let pdu = pdu.into();
        let encoded = codec.encode(&pdu).unwrap();

        group.bench_function(BenchmarkId::new("encode", level), |b| {
            b.iter(|| black_box(codec.encode(&pdu).unwrap()))
        });
        group.bench_function(BenchmarkId::new("decode", level), |b| {
            b.iter(|| black_box(codec.decode(encoded.clone(), &user).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_key_derivation,
    bench_hmac,
    bench_privacy,
    bench_codec,
);

criterion_main!(benches);
