use modt_usb::commands::{EP_COMMAND_OUT, EP_RESPONSE_IN, EP_STATUS_OUT};
use modt_usb::device::{ExecutableModT, ModTCommands, TransportConfig};
use modt_usb::error::TransportError;
use std::collections::VecDeque;

// Stands in for a printer: replays queued read results and records every write.
#[derive(Default)]
struct SimulatedModT {
    reads: VecDeque<Result<Vec<u8>, rusb::Error>>,
    read_calls: usize,
    writes: Vec<(u8, Vec<u8>)>,
    write_error: Option<rusb::Error>,
    short_write: bool,
}

impl SimulatedModT {
    fn replying(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            reads: chunks.into_iter().map(Ok).collect(),
            ..Default::default()
        }
    }
}

impl ExecutableModT for SimulatedModT {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, rusb::Error> {
        if let Some(error) = self.write_error {
            return Err(error);
        }
        self.writes.push((endpoint, data.to_vec()));
        if self.short_write {
            return Ok(data.len() / 2);
        }
        Ok(data.len())
    }

    fn read_bulk(&mut self, endpoint: u8, buf: &mut [u8]) -> Result<usize, rusb::Error> {
        assert_eq!(endpoint, EP_RESPONSE_IN);
        self.read_calls += 1;

        // An empty queue behaves like a printer that has gone quiet.
        let chunk = self.reads.pop_front().unwrap_or(Err(rusb::Error::Timeout))?;
        assert!(chunk.len() <= buf.len());
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    fn config(&self) -> TransportConfig {
        TransportConfig::default()
    }
}

impl ModTCommands for SimulatedModT {}

fn filled(byte: u8, length: usize) -> Vec<u8> {
    vec![byte; length]
}

#[test]
fn status_request_round_trip() {
    let mut printer = SimulatedModT::replying(vec![br#"{"status":"ready"}"#.to_vec()]);

    let response = printer.request_status().unwrap();

    assert_eq!(response, br#"{"status":"ready"}"#.to_vec());
    assert_eq!(response.len(), 18);
    assert_eq!(
        printer.writes,
        vec![(
            EP_STATUS_OUT,
            br#"{"metadata":{"version":1,"type":"status"}}"#.to_vec()
        )]
    );
    assert_eq!(printer.read_calls, 1);
}

#[test]
fn concatenates_full_chunks_until_short_packet() {
    let first = filled(b'a', 64);
    let second = filled(b'b', 64);
    let last = filled(b'c', 10);
    let mut printer = SimulatedModT::replying(vec![first.clone(), second.clone(), last.clone()]);

    let response = printer.receive_frame(EP_RESPONSE_IN).unwrap();

    assert_eq!(response.len(), 138);
    assert_eq!(response, [first, second, last].concat());
    assert_eq!(printer.read_calls, 3);
}

#[test]
fn exact_multiple_needs_one_more_read() {
    let first = filled(b'x', 64);
    let second = filled(b'y', 64);
    let mut printer = SimulatedModT::replying(vec![first.clone(), second.clone(), Vec::new()]);

    let response = printer.receive_frame(EP_RESPONSE_IN).unwrap();

    assert_eq!(response, [first, second].concat());
    assert_eq!(printer.read_calls, 3);
    assert!(printer.reads.is_empty());
}

#[test]
fn zero_length_terminator_on_its_own() {
    let mut printer = SimulatedModT::replying(vec![Vec::new()]);
    assert_eq!(printer.receive_frame(EP_RESPONSE_IN).unwrap(), Vec::<u8>::new());
}

#[test]
fn stalled_terminator_times_out() {
    // The printer sends a full chunk and then nothing at all.
    let chunk = filled(b'z', 64);
    let mut printer = SimulatedModT::replying(vec![chunk]);

    let result = printer.receive_frame(EP_RESPONSE_IN);

    assert_eq!(result, Err(TransportError::Timeout));
    assert_eq!(printer.read_calls, 2);
}

#[test]
fn disconnected_printer_fails_instead_of_hanging() {
    let mut printer = SimulatedModT {
        write_error: Some(rusb::Error::NoDevice),
        ..Default::default()
    };
    assert_eq!(printer.request_status(), Err(TransportError::Disconnected));
    assert_eq!(printer.read_calls, 0);

    let mut printer = SimulatedModT {
        reads: VecDeque::from([Err(rusb::Error::NoDevice)]),
        ..Default::default()
    };
    assert_eq!(printer.request_status(), Err(TransportError::Disconnected));
}

#[test]
fn other_usb_errors_are_surfaced_without_retry() {
    let mut printer = SimulatedModT {
        reads: VecDeque::from([Err(rusb::Error::Pipe), Ok(b"late".to_vec())]),
        ..Default::default()
    };

    let result = printer.receive_frame(EP_RESPONSE_IN);

    assert_eq!(result, Err(TransportError::UsbError(rusb::Error::Pipe)));
    assert_eq!(printer.read_calls, 1);
}

#[test]
fn honours_custom_chunk_size() {
    let mut printer = SimulatedModT::replying(vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]);
    let response = printer.receive_frame_with(EP_RESPONSE_IN, 4).unwrap();
    assert_eq!(response, b"abcdefghij".to_vec());
}

#[test]
fn zero_chunk_size_is_rejected() {
    let mut printer = SimulatedModT::replying(vec![b"never read".to_vec()]);
    assert_eq!(
        printer.receive_frame_with(EP_RESPONSE_IN, 0),
        Err(TransportError::InvalidChunkSize)
    );
    assert_eq!(printer.read_calls, 0);
}

#[test]
fn unload_filament_writes_header_then_body() {
    let mut printer = SimulatedModT::default();

    // Nothing queued, so the acknowledgement read times out.
    assert_eq!(printer.unload_filament(), Ok(None));

    assert_eq!(printer.writes.len(), 2);
    assert_eq!(
        printer.writes[0],
        (EP_COMMAND_OUT, vec![0x24, 0x6c, 0x00, 0x93, 0xff])
    );
    assert_eq!(printer.writes[1].0, EP_COMMAND_OUT);
    assert_eq!(
        printer.writes[1].1,
        br#"{"transport":{"attrs":["request","twoway"],"id":11},"data":{"command":{"idx":51,"name":"unload_initiate"}}};"#
            .to_vec()
    );
    assert_eq!(printer.read_calls, 1);
}

#[test]
fn unload_acknowledgement_is_not_read_as_status() {
    let mut printer = SimulatedModT::replying(vec![
        br#"{"transport":{"attrs":["reply"],"id":11}}"#.to_vec(),
        br#"{"status":"unloading"}"#.to_vec(),
    ]);

    let reply = printer.unload_filament().unwrap();
    let status = printer.request_status().unwrap();

    assert_eq!(
        reply,
        Some(br#"{"transport":{"attrs":["reply"],"id":11}}"#.to_vec())
    );
    assert_eq!(status, br#"{"status":"unloading"}"#.to_vec());
}

#[test]
fn unload_surfaces_disconnect_while_waiting_for_reply() {
    let mut printer = SimulatedModT {
        reads: VecDeque::from([Err(rusb::Error::NoDevice)]),
        ..Default::default()
    };
    assert_eq!(printer.unload_filament(), Err(TransportError::Disconnected));
}

#[test]
fn short_write_is_an_error() {
    let mut printer = SimulatedModT {
        short_write: true,
        ..Default::default()
    };

    assert_eq!(
        printer.send(EP_STATUS_OUT, b"0123456789"),
        Err(TransportError::ShortWrite {
            expected: 10,
            written: 5
        })
    );
}
