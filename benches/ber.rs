//! BER and community message benchmarks.

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snmp_wire::ber::{Decoder, EncodeBuf};
use snmp_wire::v3::SecurityParameters;
use snmp_wire::{Codec, Oid, PduType, V2cPdu, Value, VarBind, VarBindList};
use std::hint::black_box;
use std::sync::Arc;

fn interface_rows(n: u32) -> VarBindList {
    let rows: Vec<VarBind> = (0..n)
        .map(|i| {
            VarBind::new(
                Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2, i]),
                Value::OctetString(Bytes::from(format!("GigabitEthernet0/{}", i))),
            )
        })
        .collect();
    VarBindList::try_from(rows).unwrap()
}

fn bench_integer_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer_encode");

    let values = [
        ("zero", 0i32),
        ("boundary_128", 128),
        ("boundary_neg129", -129),
        ("max_i32", i32::MAX),
        ("min_i32", i32::MIN),
    ];

    for (name, value) in values {
        group.bench_with_input(BenchmarkId::new("encode", name), &value, |b, &v| {
            b.iter(|| {
                let mut buf = EncodeBuf::new();
                buf.push_integer(v);
                black_box(buf.finish())
            })
        });
    }

    group.finish();
}

fn bench_value_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_decode");

    let values: Vec<(&str, Value)> = vec![
        ("integer", Value::Integer(42)),
        ("counter64", Value::Counter64(1_000_000_000_000)),
        (
            "octet_string",
            Value::OctetString(Bytes::from_static(
                b"Linux router 5.15.0-generic #123-Ubuntu SMP",
            )),
        ),
        (
            "oid",
            Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0])),
        ),
    ];

    for (name, value) in &values {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        let encoded = buf.finish();

        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| {
                let mut decoder = Decoder::new(data.clone());
                black_box(Value::decode(&mut decoder).unwrap())
            })
        });
    }

    group.finish();
}

/// Full v2c round trip through the codec, pooled buffers included.
fn bench_community_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("community_codec");
    let codec = Codec::default();
    let unused = Arc::new(SecurityParameters::discovery().unwrap());

    for rows in [3u32, 10, 50] {
        let mut pdu = V2cPdu::new(PduType::Response, "public").unwrap();
        pdu.set_request_id(12345);
        pdu.set_varbinds(interface_rows(rows));
        let pdu = pdu.into();
        let encoded = codec.encode(&pdu).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", rows), &pdu, |b, pdu| {
            b.iter(|| black_box(codec.encode(pdu).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("decode", rows), &encoded, |b, data| {
            b.iter(|| black_box(codec.decode(data.clone(), &unused).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_integer_encode,
    bench_value_decode,
    bench_community_codec,
);

criterion_main!(benches);
