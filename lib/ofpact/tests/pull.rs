// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Decoding of whole action lists, as a switch would receive them.

mod common;

use common::*;
use ofpact::engine::bundle::BundleAlgorithm;
use ofpact::engine::layout::OFPACT_ALIGNTO;
use ofpact::engine::multipath::HashFields;
use ofpact::engine::ofpact::OfpactOutput;

// An output to a physical port, checked against a switch with enough
// ports, survives the trip in and back out untouched.
#[test]
fn output_to_physical_port() {
    let wire = output(5, 0);
    let ofpacts = pull(&wire).unwrap();

    assert_eq!(ofpacts.count(), 1);
    let rec = ofpacts.iter().next().unwrap();
    assert_eq!(rec.kind(), OfpactType::Output);
    assert_eq!(rec.compat(), Some(ActionCode::Ofpat10Output));
    assert_eq!(
        rec.ofpact(),
        Ofpact::Output(OfpactOutput { port: 5, max_len: 0 })
    );

    let ctx = CheckCtx::new(HeaderShape::ethernet(), 128);
    assert_eq!(ctx.check(&ofpacts, &NullLog), Ok(()));
    assert_eq!(push(&ofpacts), wire);
}

#[test]
fn unsupported_vendor() {
    let mut wire = output(1, 0);
    let mut foreign = nx(1, &[0, 3]);
    foreign[4..8].copy_from_slice(&0x0000_2321u32.to_be_bytes());
    wire.extend_from_slice(&foreign);

    let err = pull(&wire).unwrap_err();
    assert_eq!(err.offset, 8);
    assert_eq!(err.code, None);
    assert_eq!(err.err, OfpErr::BadVendor);
}

#[test]
fn failures_are_logged() {
    let log = CaptureLog::default();
    let mut wire = output(1, 0);
    wire.extend_from_slice(&ofp10(12, &[0; 4]));

    let err = pull_openflow(&wire, wire.len(), &log).unwrap_err();
    assert_eq!(err.err, OfpErr::BadType);
    assert_eq!(
        log.lines(),
        vec![(
            LogLevel::Warn,
            "bad action at offset 8 (unknown): OFPBAC_BAD_TYPE".to_string()
        )]
    );

    // Once identified, the action's name appears in the message.
    let log = CaptureLog::default();
    let wire = output(OFPP_MAX, 0);
    pull_openflow(&wire, wire.len(), &log).unwrap_err();
    assert_eq!(
        log.lines()[0].1,
        "bad action at offset 0 (OFPAT10_OUTPUT): OFPBAC_BAD_OUT_PORT"
    );

    // Success is quiet.
    let log = CaptureLog::default();
    let wire = output(1, 0);
    pull_openflow(&wire, wire.len(), &log).unwrap();
    assert!(log.lines().is_empty());
}

#[test]
fn garbled_length_is_logged() {
    let log = CaptureLog::default();
    let mut wire = output(1, 0);
    // Claims 12 bytes.
    wire.extend_from_slice(&[0, 0, 0, 12, 0, 1, 0, 0]);

    let err = pull_openflow(&wire, wire.len(), &log).unwrap_err();
    assert_eq!(err.offset, 8);
    assert_eq!(err.err, OfpErr::BadLen);
    assert_eq!(
        log.lines(),
        vec![(LogLevel::Warn, "bad action format at offset 8".to_string())]
    );
}

// One bad action anywhere rejects the whole list.
#[test]
fn all_or_nothing() {
    let good: Vec<u8> = every_action().concat();
    assert!(pull(&good).is_ok());

    let mut wire = good.clone();
    wire.extend_from_slice(&set_vlan_vid(0x1000));
    let err = pull(&wire).unwrap_err();
    assert_eq!(err.offset, good.len());
    assert_eq!(err.code, Some(ActionCode::Ofpat10SetVlanVid));
    assert_eq!(err.err, OfpErr::BadArgument);

    let mut wire = set_vlan_vid(0x1000);
    wire.extend_from_slice(&good);
    assert_eq!(pull(&wire).unwrap_err().offset, 0);
}

#[test]
fn declared_length_is_honored() {
    let mut wire = output(1, 0);
    wire.extend_from_slice(&output(2, 0));

    // Only the first action is part of the list.
    let ofpacts = pull_openflow(&wire, 8, &NullLog).unwrap();
    assert_eq!(ofpacts.count(), 1);
    assert!(ofpacts.references_port(1));
    assert!(!ofpacts.references_port(2));

    let err = pull_openflow(&wire, 24, &NullLog).unwrap_err();
    assert_eq!(err.err, OfpErr::BadRequestLen);
    let err = pull_openflow(&wire, 12, &NullLog).unwrap_err();
    assert_eq!(err.err, OfpErr::BadRequestLen);
}

#[test]
fn bundle_slaves() {
    let wire = bundle(1, 0, None, &[1, 2]);
    let ofpacts = pull(&wire).unwrap();
    let Ofpact::Bundle(b) = ofpacts.iter().next().unwrap().ofpact() else {
        panic!("expected a bundle");
    };

    assert_eq!(b.algorithm, BundleAlgorithm::Hrw);
    assert_eq!(b.fields, HashFields::EthSrc);
    assert_eq!(b.dst, None);
    assert_eq!(b.slaves.iter().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(b.slaves.get(2), None);
    assert!(ofpacts.references_port(2));
    assert!(!ofpacts.references_port(3));

    // More slaves claimed than carried.
    let mut wire = bundle(1, 0, None, &[1, 2]);
    wire[21] = 9;
    assert_eq!(pull(&wire).unwrap_err().err, OfpErr::BadLen);

    // The controller is never a slave.
    let wire = bundle(1, 0, None, &[1, OFPP_CONTROLLER]);
    assert_eq!(pull(&wire).unwrap_err().err, OfpErr::BadArgument);

    // A plain bundle carries no destination.
    let reg0 = MfSubfield::whole(MfFieldId::Reg0);
    let mut wire = bundle(0, 1, Some(reg0), &[3]);
    wire[9] = 12;
    assert_eq!(pull(&wire).unwrap_err().err, OfpErr::BadArgument);
}

#[test]
fn bundle_load_destination() {
    let reg0 = MfSubfield::whole(MfFieldId::Reg0);
    let ofpacts = pull(&bundle(0, 1, Some(reg0), &[3, 4, 5])).unwrap();
    let Ofpact::Bundle(b) = ofpacts.iter().next().unwrap().ofpact() else {
        panic!("expected a bundle");
    };
    assert_eq!(b.algorithm, BundleAlgorithm::ActiveBackup);
    assert_eq!(b.fields, HashFields::SymmetricL4);
    assert_eq!(b.dst, Some(reg0));
    assert_eq!(b.slaves.len(), 3);

    // Too narrow to hold a port number.
    let narrow = MfSubfield { field: MfFieldId::Reg0, ofs: 0, n_bits: 8 };
    let err = pull(&bundle(0, 1, Some(narrow), &[3])).unwrap_err();
    assert_eq!(err.err, OfpErr::BadArgument);

    // Not writable.
    let in_port = MfSubfield::whole(MfFieldId::InPort);
    let err = pull(&bundle(0, 1, Some(in_port), &[3])).unwrap_err();
    assert_eq!(err.err, OfpErr::BadArgument);
}

#[test]
fn every_kind_decodes() {
    let actions = every_action();
    let ofpacts = pull(&actions.concat()).unwrap();
    assert_eq!(ofpacts.count(), actions.len());

    // Every kind but the sentinel turns up at least once.
    for kind in OfpactType::ALL.iter().filter(|k| **k != OfpactType::End) {
        assert!(
            ofpacts.iter().any(|rec| rec.kind() == *kind),
            "no {kind} record"
        );
    }
}

// Records are packed at aligned offsets, each one's successor starting
// at the aligned end of its predecessor, with the sentinel last.
#[test]
fn records_are_aligned() {
    let ofpacts = pull(&every_action().concat()).unwrap();

    let mut expected = 0;
    for (i, rec) in ofpacts.iter().enumerate() {
        assert_eq!(rec.index(), i);
        assert_eq!(rec.offset(), expected);
        assert_eq!(rec.offset() % OFPACT_ALIGNTO, 0);
        assert!(rec.len() <= rec.size());
        assert_eq!(rec.size() % OFPACT_ALIGNTO, 0);
        assert!(rec.size() - rec.len() < OFPACT_ALIGNTO);
        expected = rec.next_offset();
    }

    assert_eq!(ofpacts.end_offset(), expected);
    assert_eq!(ofpacts.len(), expected + OFPACT_ALIGNTO);
    let end = &ofpacts.as_bytes()[expected..];
    assert_eq!(end[0], OfpactType::End as u8);
}

#[test]
fn compat_is_recorded() {
    let cases = [
        (resubmit(3), ActionCode::NxastResubmit),
        (resubmit_table(3, 0xff), ActionCode::NxastResubmitTable),
        (set_tunnel(7), ActionCode::NxastSetTunnel),
        (set_tunnel64(7), ActionCode::NxastSetTunnel64),
        (controller(1, 2, 0), ActionCode::NxastController),
    ];

    for (wire, code) in cases {
        let ofpacts = pull(&wire).unwrap();
        assert_eq!(ofpacts.iter().next().unwrap().compat(), Some(code));
    }
}
