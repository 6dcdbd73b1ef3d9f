#![no_main]

use libfuzzer_sys::fuzz_target;
use voltage_rtu::{decode_response, response_adu_len, RequestHeader};

fuzz_target!(|data: &[u8]| {
    let _ = response_adu_len(data);
    let _ = RequestHeader::parse(data);

    if let Ok(response) = decode_response(data) {
        assert!(response.adu_len() <= data.len());

        let mut bits = [false; 2048];
        let mut registers = [0u16; 128];
        let _ = response.read_bits_into(&mut bits);
        let _ = response.read_registers_into(&mut registers);
        let _ = response.write_echo();
    }
});
