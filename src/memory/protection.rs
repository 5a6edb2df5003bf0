// Wed Aug 19 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protection {
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
    Execute = 4,
    ReadExecute = 5,
    WriteExecute = 6,
    ReadWriteExecute = 7,
}

impl Protection {
    pub fn from_flags(flags: u32) -> Self {
        match flags & 7 {
            0 => Self::None,
            1 => Self::Read,
            2 => Self::Write,
            3 => Self::ReadWrite,
            4 => Self::Execute,
            5 => Self::ReadExecute,
            6 => Self::WriteExecute,
            7 => Self::ReadWriteExecute,
            _ => Self::None,
        }
    }

    /// Parse the flags column of a /proc/<pid>/maps line, e.g. "rw-p".
    pub fn from_proc_flags(flags: &str) -> Self {
        let mut bits = 0;
        let mut chars = flags.chars();
        if chars.next() == Some('r') {
            bits |= 1;
        }
        if chars.next() == Some('w') {
            bits |= 2;
        }
        if chars.next() == Some('x') {
            bits |= 4;
        }
        Self::from_flags(bits)
    }

    pub fn can_read(self) -> bool {
        self as u32 & 1 != 0
    }

    pub fn can_write(self) -> bool {
        self as u32 & 2 != 0
    }

    pub fn can_execute(self) -> bool {
        self as u32 & 4 != 0
    }

    /// The only protections the struct scan looks inside: writable data
    /// regions, with or without execute.
    pub fn is_scannable(self) -> bool {
        matches!(self, Self::ReadWrite | Self::ReadWriteExecute)
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.can_read() { 'r' } else { '-' };
        let w = if self.can_write() { 'w' } else { '-' };
        let x = if self.can_execute() { 'x' } else { '-' };
        write!(f, "{}{}{}", r, w, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proc_flags_parse() {
        assert_eq!(Protection::from_proc_flags("rw-p"), Protection::ReadWrite);
        assert_eq!(Protection::from_proc_flags("r-xp"), Protection::ReadExecute);
        assert_eq!(Protection::from_proc_flags("rwxs"), Protection::ReadWriteExecute);
        assert_eq!(Protection::from_proc_flags("---p"), Protection::None);
    }

    #[test]
    fn test_scannable_filter() {
        assert!(Protection::ReadWrite.is_scannable());
        assert!(Protection::ReadWriteExecute.is_scannable());
        assert!(!Protection::Read.is_scannable());
        assert!(!Protection::ReadExecute.is_scannable());
    }
}
