#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voltage_rtu::{verify_crc, ModbusRequest, RequestHeader, MAX_MESSAGE_LENGTH};

#[derive(Debug, Arbitrary)]
enum Input {
    Read { function: u8, address: u16, quantity: u16 },
    WriteCoil { address: u16, value: bool },
    WriteRegister { address: u16, value: u16 },
    WriteCoils { address: u16, values: Vec<bool> },
    WriteRegisters { address: u16, values: Vec<u16> },
}

fuzz_target!(|input: (u8, usize, Input)| {
    let (unit, capacity, input) = input;
    let request = match &input {
        Input::Read { function, address, quantity } => {
            let (address, quantity) = (*address, *quantity);
            match function % 4 {
                0 => ModbusRequest::ReadCoils { address, quantity },
                1 => ModbusRequest::ReadDiscreteInputs { address, quantity },
                2 => ModbusRequest::ReadHoldingRegisters { address, quantity },
                _ => ModbusRequest::ReadInputRegisters { address, quantity },
            }
        }
        Input::WriteCoil { address, value } => ModbusRequest::WriteSingleCoil {
            address: *address,
            value: *value,
        },
        Input::WriteRegister { address, value } => ModbusRequest::WriteSingleRegister {
            address: *address,
            value: *value,
        },
        Input::WriteCoils { address, values } => ModbusRequest::WriteMultipleCoils {
            address: *address,
            values,
        },
        Input::WriteRegisters { address, values } => ModbusRequest::WriteMultipleRegisters {
            address: *address,
            values,
        },
    };

    let mut buf = [0u8; MAX_MESSAGE_LENGTH];
    let capacity = capacity % (MAX_MESSAGE_LENGTH + 1);
    let Ok(len) = request.encode(unit, &mut buf[..capacity]) else {
        // Nothing written past a rejected request
        assert!(buf.iter().all(|&b| b == 0));
        return;
    };

    assert_eq!(len, request.encoded_len());
    verify_crc(&buf[..len]).expect("encoded request must carry a valid CRC");

    let header = RequestHeader::parse(&buf[..len]).expect("encoded request must parse");
    assert_eq!(header.unit, unit);
    assert_eq!(header.function, request.function());
    assert_eq!(header.address, request.address());
});
