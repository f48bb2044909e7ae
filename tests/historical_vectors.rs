//! Known-answer tests against historical machine settings.
//!
//! Every expected value below comes from published keys and messages, not
//! from this library's own output.

use bitnigma::{BitnigmaError, ConfigBuilder, Machine, Mode, RotorSetting, WiringCatalog};

fn catalog() -> WiringCatalog {
    WiringCatalog::historical().expect("historical catalog is valid")
}

fn enigma_i(rings: [usize; 3], positions: [usize; 3]) -> Machine {
    let names = ["enig1", "enig2", "enig3"];
    let config = ConfigBuilder::new(Mode::Classic)
        .rotors(
            (0..3).map(|i| RotorSetting::new(names[i]).ring(rings[i]).position(positions[i])),
        )
        .reflector("ref-b")
        .build(&catalog())
        .expect("valid configuration");
    Machine::new(config)
}

// ═══════════════════════════════════════════════════════════════════════
// Rotors I-II-III, reflector B
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn aaaaa_enciphers_to_bdzgo() {
    let mut machine = enigma_i([0, 0, 0], [0, 0, 0]);
    assert_eq!(machine.encipher_str("AAAAA").unwrap(), "BDZGO");
}

#[test]
fn bdzgo_deciphers_to_aaaaa() {
    let mut machine = enigma_i([0, 0, 0], [0, 0, 0]);
    assert_eq!(machine.encipher_str("BDZGO").unwrap(), "AAAAA");
}

#[test]
fn ring_settings_bbb() {
    let mut machine = enigma_i([1, 1, 1], [0, 0, 0]);
    assert_eq!(machine.encipher_str("AAAAA").unwrap(), "EWTYX");
}

#[test]
fn double_step_trace_from_adu() {
    let mut machine = enigma_i([0, 0, 0], [0, 3, 20]);
    let mut windows = vec![machine.window().unwrap()];
    for _ in 0..4 {
        machine.encipher(0);
        windows.push(machine.window().unwrap());
    }
    assert_eq!(windows, ["ADU", "ADV", "AEW", "BFX", "BFY"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Operation Barbarossa, 1941: rotors II-IV-V, rings BUL, start BLA
// ═══════════════════════════════════════════════════════════════════════

const BARBAROSSA_CIPHERTEXT: &str = "EDPUD NRGYS ZRCXN UYTPO MRMBO FKTBZ REZKM LXLVE FGUEY SIOZV \
     EQMIK UBPMM YLKLT TDEIS MDICA GYKUA CTCDO MOHWX MUUIA UBSTS LRNBZ SZWNR FXWFY SSXJZ \
     VIJHI DISHP RKLKA YUPAD TXQSP INQMA TLPIF SVKDA SCTAC DPBOP VHJK";

const BARBAROSSA_PLAINTEXT: &str = "AUFKLXABTEILUNGXVONXKURTINOWAXKURTINOWAXNORDWESTLXSEBEZ\
     XSEBEZXUAFFLIEGERSTRASZERIQTUNGXDUBROWKIXDUBROWKIXOPOTSCHKAXOPOTSCHKAXUMXEINSAQT\
     DREINULLXUHRANGETRETENXANGRIFFXINFXRGTX";

fn barbarossa() -> Machine {
    let config = ConfigBuilder::new(Mode::Classic)
        .rotor_str("enig2:B::B")
        .unwrap()
        .rotor_str("army4:U::L")
        .unwrap()
        .rotor_str("army5:L::A")
        .unwrap()
        .reflector("ref-b")
        .plug_letters(&["AV", "BS", "CG", "DL", "FU", "HZ", "IN", "KM", "OW", "RX"])
        .unwrap()
        .build(&catalog())
        .unwrap();
    Machine::new(config)
}

#[test]
fn barbarossa_message_deciphers() {
    let mut machine = barbarossa();
    // Classic mode drops the group separators.
    let plain = machine.encipher_str(BARBAROSSA_CIPHERTEXT).unwrap();
    assert_eq!(plain, BARBAROSSA_PLAINTEXT);
}

#[test]
fn barbarossa_message_enciphers_back() {
    let mut machine = barbarossa();
    let cipher = machine.encipher_str(BARBAROSSA_PLAINTEXT).unwrap();
    let expected: String = BARBAROSSA_CIPHERTEXT
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    assert_eq!(cipher, expected);
}

// ═══════════════════════════════════════════════════════════════════════
// Validation of historical parts
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn no_letter_enciphers_to_itself() {
    let mut machine = enigma_i([0, 0, 0], [0, 0, 0]);
    let plain = "A".repeat(500);
    let cipher = machine.encipher_str(&plain).unwrap();
    assert!(!cipher.contains('A'));
}

#[test]
fn greek_wheel_is_not_a_reflector() {
    let result = ConfigBuilder::new(Mode::Classic)
        .rotors(["enig1", "enig2", "enig3"].map(RotorSetting::new))
        .reflector("beta")
        .build(&catalog());
    assert!(matches!(result, Err(BitnigmaError::UnknownReflector(name)) if name == "beta"));
}

#[test]
fn four_rotor_thin_reflector_machine_is_reciprocal() {
    let config = ConfigBuilder::new(Mode::Classic)
        .rotors(["beta", "navy6", "enig1", "enig3"].map(RotorSetting::new))
        .reflector("ref-bt")
        .build(&catalog())
        .unwrap();
    let mut encoder = Machine::new(config.clone());
    let mut decoder = Machine::new(config);
    let plain = "UBOOTXNACHXNORDENXKURSXDREIXNULLXNULL";
    let cipher = encoder.encipher_str(plain).unwrap();
    assert_ne!(cipher, plain);
    assert_eq!(decoder.encipher_str(&cipher).unwrap(), plain);
}

#[test]
fn greek_wheel_stays_put_while_the_others_double_step() {
    let config = ConfigBuilder::new(Mode::Classic)
        .rotors(
            [("beta", 0), ("enig1", 16), ("enig2", 3), ("enig3", 20)]
                .map(|(name, position)| RotorSetting::new(name).position(position)),
        )
        .reflector("ref-bt")
        .build(&catalog())
        .unwrap();
    let mut machine = Machine::new(config);

    // Rotor I starts on its own notch Q; only the middle pawl may move it.
    let mut trace = vec![machine.window().unwrap()];
    for _ in 0..4 {
        machine.encipher(0);
        trace.push(machine.window().unwrap());
    }
    assert_eq!(trace, vec!["AQDU", "AQDV", "AQEW", "ARFX", "ARFY"]);

    for _ in 0..20_000 {
        machine.encipher(0);
    }
    assert_eq!(machine.positions()[0], 0);
}
