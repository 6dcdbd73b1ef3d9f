use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voltage_rtu::{
    compute_crc, decode_response, encode_read_holding_registers, encode_write_multiple_coils,
    encode_write_multiple_registers, MAX_MESSAGE_LENGTH,
};

fn bench_crc(c: &mut Criterion) {
    let data = [0x5Au8; 256];
    let mut group = c.benchmark_group("crc");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("crc16_modbus_256", |b| {
        b.iter(|| compute_crc(black_box(&data)))
    });
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let mut buf = [0u8; MAX_MESSAGE_LENGTH];

    group.bench_function("read_holding_registers", |b| {
        b.iter(|| encode_read_holding_registers(black_box(1), black_box(0x006B), 125, &mut buf))
    });

    let registers: Vec<u16> = (0..123).collect();
    group.bench_function("write_multiple_registers_123", |b| {
        b.iter(|| encode_write_multiple_registers(1, 0, black_box(&registers), &mut buf))
    });

    let coils: Vec<bool> = (0..1968).map(|i| i % 3 == 0).collect();
    group.bench_function("write_multiple_coils_1968", |b| {
        b.iter(|| encode_write_multiple_coils(1, 0, black_box(&coils), &mut buf))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut frame = vec![0x01, 0x03, 250];
    for i in 0..125u16 {
        frame.extend_from_slice(&i.to_be_bytes());
    }
    let crc = compute_crc(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("read_registers_125", |b| {
        let mut dest = [0u16; 125];
        b.iter(|| {
            let response = decode_response(black_box(&frame)).unwrap();
            response.read_registers_into(&mut dest).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_crc, bench_encode, bench_decode);
criterion_main!(benches);
