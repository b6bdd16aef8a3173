// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{Body, Decoded, LogRecord};
use crate::Error;
use crate::header::HEADER_SIZE;
use proptest::collection::vec;
use proptest::prelude::*;

fn decode_all(mut data: &[u8]) -> Result<Vec<LogRecord>, Error> {
    let mut records = Vec::new();
    while let Decoded::Record(record, consumed) = LogRecord::from_slice(data, records.len())? {
        records.push(record);
        data = &data[consumed..];
    }
    Ok(records)
}

#[test]
fn std_record() {
    let mut record = LogRecord::std(3, 3, 0x8000, vec![0x1, 0x2]);
    record.dropped = 4;
    record.timestamp = 1000;

    let bytes = record.to_bytes().unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 8);
    assert_eq!(&bytes[12..16], &[1, 0, 0, 0]);

    assert_eq!(
        LogRecord::from_slice(&bytes, 0).unwrap(),
        Decoded::Record(record, 20)
    );
}

#[test]
fn hexdump_record() {
    let record = LogRecord::hexdump(5, 4, 0x3ff, vec![0xaa; 1023]);
    let bytes = record.to_bytes().unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 1023);

    let Decoded::Record(decoded, consumed) = LogRecord::from_slice(&bytes, 0).unwrap() else {
        panic!("Expected a record");
    };
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, record);
}

#[test]
fn field_overflow() {
    let record = LogRecord::std(0, 0, 0, vec![0; 16]);
    assert!(matches!(
        record.to_bytes(),
        Err(Error::FieldOverflow { field: "nargs", value: 16, .. })
    ));

    let record = LogRecord::std(0, 0, 1 << 22, vec![]);
    assert!(matches!(
        record.to_bytes(),
        Err(Error::FieldOverflow { field: "addr", .. })
    ));

    let record = LogRecord::hexdump(0, 8, 0, vec![]);
    assert!(matches!(
        record.to_bytes(),
        Err(Error::FieldOverflow { field: "severity", .. })
    ));

    let record = LogRecord::hexdump(0, 0, 0, vec![0; 1024]);
    assert!(matches!(
        record.to_bytes(),
        Err(Error::FieldOverflow { field: "len", .. })
    ));
}

#[test]
fn invalid_is_not_encodable() {
    let record = LogRecord {
        in_progress: false,
        module_id: 1,
        dropped: 0,
        timestamp: 0,
        body: Body::Invalid { tag: 3, bits: 0 },
    };
    assert!(matches!(record.to_bytes(), Err(Error::UnencodableRecord)));
    assert_eq!(record.severity(), None);
}

#[test]
fn invalid_record_has_no_payload() {
    for tag in [0u32, 3] {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(tag | (1 << 2) | (0xffff << 6)).to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 2, 0, 3, 0, 0, 0]);
        // Trailing bytes belong to the next record
        bytes.extend_from_slice(&[0xff; 40]);

        let Decoded::Record(record, consumed) = LogRecord::from_slice(&bytes, 0).unwrap() else {
            panic!("Expected a record");
        };
        assert_eq!(consumed, HEADER_SIZE);
        assert!(record.in_progress);
        assert_eq!(record.module_id, 1);
        assert_eq!(record.dropped, 2);
        assert_eq!(record.timestamp, 3);
        assert_eq!(
            record.body,
            Body::Invalid {
                tag: tag as u8,
                bits: 0xffff << 3
            }
        );
    }
}

#[test]
fn end_of_stream() {
    assert_eq!(LogRecord::from_slice(&[], 0).unwrap(), Decoded::EndOfStream);

    let bytes = LogRecord::std(1, 1, 0x8000, vec![]).to_bytes().unwrap();
    assert_eq!(
        LogRecord::from_slice(&bytes[..5], 0).unwrap(),
        Decoded::EndOfStream
    );
}

#[test]
fn truncated_payload() {
    let bytes = LogRecord::std(1, 1, 0x8000, vec![1, 2, 3]).to_bytes().unwrap();
    let result = LogRecord::from_slice(&bytes[..bytes.len() - 1], 7);
    assert!(matches!(
        result,
        Err(Error::TruncatedPayload {
            record: 7,
            expected: 12,
            available: 11
        })
    ));
}

#[test]
fn from_sample() {
    let data = std::fs::read("tests/samples/records.log").unwrap();
    let records = decode_all(&data).unwrap();
    assert_eq!(records.len(), 5);

    assert_eq!(
        records[0].body,
        Body::Std {
            severity: 3,
            address: 0x8000,
            args: vec![1, 2]
        }
    );
    assert_eq!(records[0].timestamp, 100);
    assert_eq!(
        records[1].body,
        Body::Hexdump {
            severity: 4,
            offset: 0,
            data: vec![0xde, 0xad, 0xbe]
        }
    );
    assert_eq!(records[1].dropped, 1);
    assert_eq!(
        records[2].body,
        Body::Invalid {
            tag: 3,
            bits: 0x1234
        }
    );
    assert_eq!(records[4].module_id, 9);

    let encoded: Vec<u8> = records
        .iter()
        .filter(|record| record.severity().is_some())
        .flat_map(|record| record.to_bytes().unwrap())
        .collect();
    assert_eq!(encoded.len(), data.len() - HEADER_SIZE);
}

#[test]
fn truncated_sample() {
    let data = std::fs::read("tests/samples/truncated.log").unwrap();
    assert!(matches!(
        decode_all(&data),
        Err(Error::TruncatedPayload {
            record: 1,
            expected: 16,
            available: 5
        })
    ));
}

fn body() -> impl Strategy<Value = Body> {
    prop_oneof![
        (0u8..8, 0u32..(1 << 22), vec(any::<u32>(), 0..=15)).prop_map(
            |(severity, address, args)| Body::Std {
                severity,
                address,
                args
            }
        ),
        (0u8..8, 0u16..1024, vec(any::<u8>(), 0..=1023)).prop_map(|(severity, offset, data)| {
            Body::Hexdump {
                severity,
                offset,
                data,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn decode_inverts_encode(
        in_progress in any::<bool>(),
        module_id in any::<u16>(),
        dropped in any::<u16>(),
        timestamp in any::<u32>(),
        body in body(),
    ) {
        let record = LogRecord { in_progress, module_id, dropped, timestamp, body };
        let bytes = record.to_bytes().unwrap();
        let decoded = LogRecord::from_slice(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, Decoded::Record(record, bytes.len()));
    }
}
