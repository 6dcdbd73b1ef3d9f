//! Voltage RTU Demo
//!
//! Encodes one request per supported function code and decodes a recorded
//! device response for each, printing the frames and the decoded results.
//!
//! Usage: cargo run --bin demo

use voltage_rtu::logging::HexFrame;
use voltage_rtu::{
    decode_response, DeviceLimits, ModbusError, ModbusRequest, ModbusResponse, RequestEncoder,
    ResponsePayload, MAX_MESSAGE_LENGTH,
};

const UNIT: u8 = 0x3F;
const START_ADDRESS: u16 = 0x3212;
const QUANTITY: u16 = 10;

const BITS_TO_WRITE: [bool; 16] = [
    true, false, false, false, false, true, false, false, false, false, true, false, false, false,
    false, true,
];
const REGS_TO_WRITE: [u16; 3] = [0xABCD, 0xEF01, 0x1234];

/// Request to encode and the recorded response bytes for it
fn scenarios() -> [(ModbusRequest<'static>, &'static [u8]); 8] {
    [
        (
            ModbusRequest::ReadCoils {
                address: START_ADDRESS,
                quantity: QUANTITY,
            },
            &[0x12, 0x01, 0x03, 0xCD, 0x68, 0x05, 0x40, 0xD1],
        ),
        (
            ModbusRequest::ReadDiscreteInputs {
                address: START_ADDRESS,
                quantity: QUANTITY,
            },
            &[0x32, 0x02, 0x03, 0xAC, 0xDB, 0x35, 0x27, 0x4B],
        ),
        (
            ModbusRequest::ReadHoldingRegisters {
                address: START_ADDRESS,
                quantity: QUANTITY,
            },
            &[0x02, 0x03, 0x06, 0x02, 0x2B, 0x00, 0x00, 0x00, 0x64, 0x11, 0x8A],
        ),
        (
            ModbusRequest::ReadInputRegisters {
                address: START_ADDRESS,
                quantity: QUANTITY,
            },
            &[
                0x02, 0x04, 0x08, 0x00, 0x0A, 0x12, 0xFE, 0x12, 0xDA, 0x7A, 0x8A, 0x2D, 0xAB,
            ],
        ),
        (
            ModbusRequest::WriteSingleCoil {
                address: START_ADDRESS,
                value: true,
            },
            &[0x01, 0x05, 0x12, 0x34, 0xFF, 0x00, 0xC8, 0x8C],
        ),
        (
            ModbusRequest::WriteMultipleCoils {
                address: START_ADDRESS,
                values: &BITS_TO_WRITE,
            },
            &[0x01, 0x0F, 0x12, 0x34, 0x02, 0x12, 0x90, 0x10],
        ),
        (
            ModbusRequest::WriteSingleRegister {
                address: START_ADDRESS,
                value: 0x2233,
            },
            &[0x01, 0x06, 0x12, 0x34, 0xFF, 0xE3, 0xCD, 0x05],
        ),
        (
            ModbusRequest::WriteMultipleRegisters {
                address: START_ADDRESS,
                values: &REGS_TO_WRITE,
            },
            &[0x01, 0x10, 0xAB, 0xCD, 0x00, 0x32, 0xF0, 0x07],
        ),
    ]
}

fn print_response(response: &ModbusResponse<'_>) -> Result<(), ModbusError> {
    match response.payload() {
        ResponsePayload::Bits(_) => {
            let mut bits = [false; 2048];
            let count = response.read_bits_into(&mut bits)?;
            let states: Vec<u8> = bits[..count].iter().map(|&b| b as u8).collect();
            println!("  Bits[]      = {:?}", states);
        }
        ResponsePayload::Registers(_) => {
            let mut registers = [0u16; 128];
            let count = response.read_registers_into(&mut registers)?;
            let hex: Vec<String> = registers[..count]
                .iter()
                .map(|r| format!("0x{:04X}", r))
                .collect();
            println!("  Registers[] = [{}]", hex.join(", "));
        }
        ResponsePayload::WriteEcho(echo) => {
            println!(
                "  Echo        = address 0x{:04X}, value 0x{:04X}",
                echo.address, echo.value
            );
        }
    }
    println!(
        "  unit={:02X}, fn_code={:02X}, adu_len={}",
        response.unit(),
        response.function().to_u8(),
        response.adu_len()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 Voltage RTU v{} Demo", voltage_rtu::VERSION);
    println!("=========================");

    let encoder = RequestEncoder::new();
    let mut adu = [0u8; MAX_MESSAGE_LENGTH];

    for (request, recorded) in scenarios() {
        println!("\n📦 {}", request.function());

        let len = encoder.encode(UNIT, &request, &mut adu)?;
        println!("  request[]   = {}", HexFrame(&adu[..len]));
        println!("  response[]  = {}", HexFrame(recorded));

        match decode_response(recorded) {
            Ok(response) => print_response(&response)?,
            Err(ModbusError::BadCrc { .. }) => println!("  ❌ Error: CRC incorrect."),
            Err(e) => println!("  ⚠️  {}", e),
        }
    }

    // Exception response: Illegal function
    println!("\n🚫 Exception response");
    let exception = [0x01, 0x81, 0x01, 0x81, 0x90];
    println!("  response[]  = {}", HexFrame(&exception));
    match decode_response(&exception) {
        Err(ModbusError::Exception { code, .. }) => println!(
            "  Exception response \"{}\", exception code={}",
            code.description(),
            code.to_u8()
        ),
        other => println!("  Unexpected result: {:?}", other),
    }

    // Device limits
    println!("\n🎛️  Device limits");
    let limited = RequestEncoder::with_limits(DeviceLimits::conservative());
    match limited.read_holding_registers(UNIT, START_ADDRESS, 100, &mut adu) {
        Ok(len) => println!("  request[]   = {}", HexFrame(&adu[..len])),
        Err(e) => println!("  Rejected: {}", e),
    }

    println!("\n🎉 Demo completed!");
    Ok(())
}
