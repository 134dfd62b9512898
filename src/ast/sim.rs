//! This module is used for holding simulation instructions ([`SimInstr`]),
//! which are instructions that directly map to mailbox words.

use super::Opcode;

/// A decoded mailbox word.
///
/// The operand of every addressed instruction is a mailbox address in `0..100`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SimInstr {
    /// Stop execution.
    HLT,
    /// `ACC = (ACC + mem[addr]) mod 1000`.
    ADD(u8),
    /// `ACC = (ACC - mem[addr]) mod 1000`, setting the negative flag on underflow.
    SUB(u8),
    /// `mem[addr] = ACC`.
    STA(u8),
    /// `ACC = mem[addr]`.
    LDA(u8),
    /// Unconditional branch.
    BRA(u8),
    /// Branch if `ACC == 0`.
    BRZ(u8),
    /// Branch if the negative flag is unset.
    BRP(u8),
    /// Read a value into `ACC`.
    INP,
    /// Write `ACC`.
    OUT,
}

impl SimInstr {
    /// Gets the opcode for the given instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            SimInstr::HLT    => Opcode::HLT,
            SimInstr::ADD(_) => Opcode::ADD,
            SimInstr::SUB(_) => Opcode::SUB,
            SimInstr::STA(_) => Opcode::STA,
            SimInstr::LDA(_) => Opcode::LDA,
            SimInstr::BRA(_) => Opcode::BRA,
            SimInstr::BRZ(_) => Opcode::BRZ,
            SimInstr::BRP(_) => Opcode::BRP,
            SimInstr::INP    => Opcode::INP,
            SimInstr::OUT    => Opcode::OUT,
        }
    }

    /// Gets the address operand, if this instruction has one.
    pub fn addr(&self) -> Option<u8> {
        match *self {
            SimInstr::ADD(a) | SimInstr::SUB(a) | SimInstr::STA(a) | SimInstr::LDA(a)
            | SimInstr::BRA(a) | SimInstr::BRZ(a) | SimInstr::BRP(a) => Some(a),
            SimInstr::HLT | SimInstr::INP | SimInstr::OUT => None,
        }
    }

    /// Converts a mailbox word into an instruction.
    ///
    /// The opcode is the hundreds digit of the word. For the `9xx` family,
    /// the low two digits select `INP` (`901`) or `OUT` (`902`).
    /// Otherwise, the low two digits are the address operand.
    ///
    /// This returns `None` if the word does not correspond to any instruction
    /// (e.g., `4xx` data words, negative words, or `9xx` with an unknown selector).
    pub fn decode(word: i16) -> Option<Self> {
        if !(0..1000).contains(&word) { return None; }

        let addr = (word % 100) as u8;
        match word / 100 {
            0 => Some(SimInstr::HLT),
            1 => Some(SimInstr::ADD(addr)),
            2 => Some(SimInstr::SUB(addr)),
            3 => Some(SimInstr::STA(addr)),
            5 => Some(SimInstr::LDA(addr)),
            6 => Some(SimInstr::BRA(addr)),
            7 => Some(SimInstr::BRZ(addr)),
            8 => Some(SimInstr::BRP(addr)),
            9 => match addr {
                1 => Some(SimInstr::INP),
                2 => Some(SimInstr::OUT),
                _ => None
            },
            _ => None
        }
    }
}
impl std::fmt::Display for SimInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "{} {addr:02}", self.opcode()),
            None => self.opcode().fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimInstr;

    #[test]
    fn test_decode_basic() {
        assert_eq!(SimInstr::decode(0), Some(SimInstr::HLT));
        assert_eq!(SimInstr::decode(42), Some(SimInstr::HLT));
        assert_eq!(SimInstr::decode(199), Some(SimInstr::ADD(99)));
        assert_eq!(SimInstr::decode(205), Some(SimInstr::SUB(5)));
        assert_eq!(SimInstr::decode(310), Some(SimInstr::STA(10)));
        assert_eq!(SimInstr::decode(500), Some(SimInstr::LDA(0)));
        assert_eq!(SimInstr::decode(612), Some(SimInstr::BRA(12)));
        assert_eq!(SimInstr::decode(777), Some(SimInstr::BRZ(77)));
        assert_eq!(SimInstr::decode(801), Some(SimInstr::BRP(1)));
        assert_eq!(SimInstr::decode(901), Some(SimInstr::INP));
        assert_eq!(SimInstr::decode(902), Some(SimInstr::OUT));
    }

    #[test]
    fn test_decode_invalid() {
        assert_eq!(SimInstr::decode(400), None);
        assert_eq!(SimInstr::decode(499), None);
        assert_eq!(SimInstr::decode(900), None);
        assert_eq!(SimInstr::decode(903), None);
        assert_eq!(SimInstr::decode(-1), None);
        assert_eq!(SimInstr::decode(1000), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SimInstr::LDA(7).to_string(), "LDA 07");
        assert_eq!(SimInstr::INP.to_string(), "INP");
        assert_eq!(SimInstr::HLT.to_string(), "HLT");
    }
}
