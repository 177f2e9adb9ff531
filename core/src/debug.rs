use std::net::TcpListener;
use std::net::TcpStream;

use gdbstub::conn::ConnectionExt;
use gdbstub::stub::SingleThreadStopReason;
use gdbstub::stub::run_blocking::BlockingEventLoop;
use gdbstub::target::ext::base::single_register_access::SingleRegisterAccess;
use gdbstub::target::ext::base::singlethread::SingleThreadBase;
use gdbstub::target::ext::base::singlethread::SingleThreadResume;
use gdbstub::target::ext::base::singlethread::SingleThreadSingleStep;
use gdbstub::target::ext::breakpoints::Breakpoints;
use gdbstub::target::ext::breakpoints::SwBreakpoint;
use gdbstub::target::Target;
use gdbstub::target::TargetError;
use gdbstub::*;

use crate::config::{EFAULT, POLL_INTERVAL, RAM_WORDS, ROM_WORDS};
use crate::*;

/// Instruction words as seen by the debugger.
const DEBUG_RAM_BASE: u32 = (ROM_WORDS * 4) as u32;
const DEBUG_RAM_END: u32 = DEBUG_RAM_BASE + (RAM_WORDS * 4) as u32;

/// How the event loop advances the core between stop reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Continue,
    Step,
}

impl Machine {
    /// Byte access for the debugger. Instruction words sit at
    /// `0x0000..0x1000` and data words right behind them.
    pub fn read_u8(&self, addr: u32) -> Result<u8> {
        if addr < DEBUG_RAM_BASE {
            Ok(self.rom.read_byte(addr))
        } else if addr < DEBUG_RAM_END {
            Ok(self.ram.read_byte(addr - DEBUG_RAM_BASE))
        } else {
            Err(Error::BadDebugAddr(addr))
        }
    }

    pub fn write_u8(&mut self, addr: u32, value: u8) -> Result<()> {
        if addr < DEBUG_RAM_BASE {
            self.rom.write_byte(addr, value);
            Ok(())
        } else if addr < DEBUG_RAM_END {
            self.ram.write_byte(addr - DEBUG_RAM_BASE, value);
            Ok(())
        } else {
            Err(Error::BadDebugAddr(addr))
        }
    }

    pub fn set_breakpoint(&mut self, addr: u32) -> Result<()> {
        if self.breakpoints.contains(&addr) {
            return Err(Error::RepeatedBreakpoint(addr));
        }
        self.breakpoints.insert(addr);
        Ok(())
    }

    pub fn rm_breakpoint(&mut self, addr: u32) -> Result<()> {
        if !self.breakpoints.remove(&addr) {
            return Err(Error::BreakpointNotFound(addr));
        }
        Ok(())
    }
}

impl Target for Machine {
    type Arch = gdbstub_arch::riscv::Riscv32;

    type Error = Error;

    #[inline(always)]
    fn base_ops(&mut self) -> target::ext::base::BaseOps<'_, Self::Arch, Self::Error> {
        target::ext::base::BaseOps::SingleThread(self)
    }

    #[inline(always)]
    fn support_breakpoints(&mut self) -> Option<target::ext::breakpoints::BreakpointsOps<'_, Self>> {
        Some(self)
    }
}

impl SingleThreadBase for Machine {
    fn read_registers(
        &mut self,
        regs: &mut <Self::Arch as arch::Arch>::Registers,
    ) -> target::TargetResult<(), Self> {
        for i in 0..32 {
            regs.x[i] = Machine::read_register(self, i as u8);
        }
        regs.pc = self.cpu.pc;

        Ok(())
    }

    fn write_registers(
        &mut self,
        regs: &<Self::Arch as arch::Arch>::Registers
    ) -> target::TargetResult<(), Self> {
        for (i, &x) in regs.x.iter().enumerate() {
            self.poke_register(i as u8, x);
        }
        self.cpu.pc = regs.pc;
        Ok(())
    }

    fn read_addrs(
        &mut self,
        start_addr: <Self::Arch as arch::Arch>::Usize,
        data: &mut [u8],
    ) -> target::TargetResult<usize, Self> {
        for (i, byte) in data.iter_mut().enumerate() {
            let b = self.read_u8(start_addr + i as <Self::Arch as arch::Arch>::Usize);
            match b {
                Ok(val) => *byte = val,
                Err(e) => if i > 0 {
                    return Ok(i);
                } else {
                    return Err(e.into());
                },
            }
        }

        Ok(data.len())
    }

    fn write_addrs(
        &mut self,
        start_addr: <Self::Arch as arch::Arch>::Usize,
        data: &[u8],
    ) -> target::TargetResult<(), Self> {
        for (i, &byte) in data.iter().enumerate() {
            self.write_u8(start_addr + i as u32, byte)?;
        }
        Ok(())
    }

    fn support_single_register_access(&mut self)
        -> Option<target::ext::base::single_register_access::SingleRegisterAccessOps<'_, (), Self>> {
        Some(self)
    }

    fn support_resume(&mut self)
        -> Option<target::ext::base::singlethread::SingleThreadResumeOps<'_, Self>> {
        Some(self)
    }

}

impl Breakpoints for Machine {
    fn support_sw_breakpoint(&mut self) -> Option<target::ext::breakpoints::SwBreakpointOps<'_, Self>> {
        Some(self)
    }
}

impl SingleRegisterAccess<()> for Machine {
    fn read_register(
        &mut self,
        _tid: (),
        reg_id: <Self::Arch as arch::Arch>::RegId,
        buf: &mut [u8],
    ) -> target::TargetResult<usize, Self> {
        match reg_id {
            gdbstub_arch::riscv::reg::id::RiscvRegId::Gpr(id) => {
                buf.copy_from_slice(&self.cpu.regs.read(Reg::new(id)).to_le_bytes());
                Ok(4)
            },
            gdbstub_arch::riscv::reg::id::RiscvRegId::Pc => {
                buf.copy_from_slice(&self.cpu.pc.to_le_bytes());
                Ok(4)
            },
            _ => Err(TargetError::NonFatal),
        }
    }

    fn write_register(
        &mut self,
        _tid: (),
        reg_id: <Self::Arch as arch::Arch>::RegId,
        val: &[u8],
    ) -> target::TargetResult<(), Self> {
        let bytes: [u8; 4] = match val.try_into() {
            Ok(bytes) => bytes,
            Err(_) => return Err(TargetError::NonFatal),
        };
        let value = u32::from_le_bytes(bytes);
        match reg_id {
            gdbstub_arch::riscv::reg::id::RiscvRegId::Gpr(id) => {
                self.poke_register(id, value);
                Ok(())
            },
            gdbstub_arch::riscv::reg::id::RiscvRegId::Pc => {
                self.cpu.pc = value;
                Ok(())
            },
            _ => Err(TargetError::NonFatal),
        }
    }
}

impl SingleThreadResume for Machine {
    fn resume(&mut self, signal: Option<common::Signal>) -> std::result::Result<(), Self::Error> {
        if signal.is_some() {
            return Err(Error::InternalError("resume with a signal is not supported".to_string()));
        }
        self.exec_mode = ExecMode::Continue;
        Ok(())
    }

    fn support_single_step(&mut self)
        -> Option<target::ext::base::singlethread::SingleThreadSingleStepOps<'_, Self>> {
        Some(self)
    }
}

impl SingleThreadSingleStep for Machine {
    fn step(&mut self, signal: Option<common::Signal>) -> std::result::Result<(), Self::Error> {
        if signal.is_some() {
            return Err(Error::InternalError("step with a signal is not supported".to_string()));
        }
        self.exec_mode = ExecMode::Step;
        Ok(())
    }
}

impl SwBreakpoint for Machine {
    fn add_sw_breakpoint(
        &mut self,
        addr: <Self::Arch as arch::Arch>::Usize,
        _kind: <Self::Arch as arch::Arch>::BreakpointKind,
    ) -> target::TargetResult<bool, Self> {
        self.set_breakpoint(addr)
            .map(|_| true)
            .map_err(|e| e.into())
    }

    fn remove_sw_breakpoint(
        &mut self,
        addr: <Self::Arch as arch::Arch>::Usize,
        _kind: <Self::Arch as arch::Arch>::BreakpointKind,
    ) -> target::TargetResult<bool, Self> {
        self.rm_breakpoint(addr)
            .map(|_| true)
            .map_err(|e| e.into())
    }
}

pub struct EventLoop {}

impl BlockingEventLoop for EventLoop {
    type Target = Machine;

    type Connection = TcpStream;

    type StopReason = SingleThreadStopReason<u32>;

    fn wait_for_stop_reason(
        target: &mut Self::Target,
        conn: &mut Self::Connection,
    ) -> std::result::Result<
        stub::run_blocking::Event<Self::StopReason>,
        stub::run_blocking::WaitForStopReasonError<
            <Self::Target as Target>::Error,
            <Self::Connection as conn::Connection>::Error,
        >,
    > {
        match target.exec_mode {
            ExecMode::Step => {
                let reason = match target.step_insn() {
                    Ok(true) => SingleThreadStopReason::DoneStep,
                    Ok(false) | Err(Error::IllegalInsn(_, _)) => {
                        SingleThreadStopReason::Signal(common::Signal::SIGILL)
                    }
                    Err(e) => return Err(stub::run_blocking::WaitForStopReasonError::Target(e)),
                };
                Ok(stub::run_blocking::Event::TargetStopped(reason))
            }
            ExecMode::Continue => {
                let mut steps: usize = 0;
                loop {
                    if steps % POLL_INTERVAL == 0 {
                        let data = conn
                            .peek()
                            .map_err(stub::run_blocking::WaitForStopReasonError::Connection)?;
                        if data.is_some() {
                            let byte = conn
                                .read()
                                .map_err(stub::run_blocking::WaitForStopReasonError::Connection)?;
                            return Ok(stub::run_blocking::Event::IncomingData(byte));
                        }
                    }
                    steps += 1;

                    match target.step_insn() {
                        Ok(true) => {
                            if target.breakpoints.contains(&target.pc()) {
                                return Ok(stub::run_blocking::Event::TargetStopped(
                                    SingleThreadStopReason::SwBreak(()),
                                ));
                            }
                        }
                        Ok(false) | Err(Error::IllegalInsn(_, _)) => {
                            return Ok(stub::run_blocking::Event::TargetStopped(
                                SingleThreadStopReason::Signal(common::Signal::SIGILL),
                            ));
                        }
                        Err(e) => return Err(stub::run_blocking::WaitForStopReasonError::Target(e)),
                    }
                }
            }
        }
    }

    fn on_interrupt(
        _target: &mut Self::Target,
    ) -> std::result::Result<Option<Self::StopReason>, <Self::Target as Target>::Error> {
        Ok(Some(SingleThreadStopReason::Signal(common::Signal::SIGINT)))
    }
}

/// Blocks until a debugger connects on `port`, then serves it until it
/// disconnects.
pub fn serve(machine: &mut Machine, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .map_err(|e| Error::IoError(e, format!("0.0.0.0:{}", port)))?;
    debug!("waiting for a debugger on port {}", port);

    let (stream, addr) = listener
        .accept()
        .map_err(|e| Error::IoError(e, String::new()))?;
    debug!("debugger connected from {}", addr);

    let gdb = stub::GdbStub::new(stream);
    match gdb.run_blocking::<EventLoop>(machine) {
        Ok(stub::DisconnectReason::TargetExited(code)) => debug!("target exited with code {}", code),
        Ok(stub::DisconnectReason::TargetTerminated(sig)) => debug!("target terminated with {}", sig),
        Ok(stub::DisconnectReason::Disconnect) => debug!("debugger disconnected"),
        Ok(stub::DisconnectReason::Kill) => debug!("debugger sent a kill request"),
        Err(e) => return Err(Error::InternalError(format!("gdb: {}", e))),
    }
    Ok(())
}

impl From<Error> for TargetError<Error> {
    fn from(value: Error) -> Self {
        match value {
            Error::BadDebugAddr(_) => Self::Errno(EFAULT),
            Error::RepeatedBreakpoint(_) | Error::BreakpointNotFound(_) => Self::NonFatal,
            _ => Self::Fatal(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_memory_window() {
        log::log_init(log::Level::Off);
        let mut machine = Machine::new();
        machine.load_program(&[0x00100093]).unwrap();
        machine.poke_data_word(0, 0xdeadbeef);
        assert_eq!(machine.read_u8(0x0000).unwrap(), 0x93);
        assert_eq!(machine.read_u8(0x1000).unwrap(), 0xef);
        assert_eq!(machine.read_u8(0x1003).unwrap(), 0xde);
        assert!(matches!(machine.read_u8(0x2000), Err(Error::BadDebugAddr(0x2000))));
    }

    #[test]
    fn test_debug_memory_write() {
        log::log_init(log::Level::Off);
        let mut machine = Machine::new();
        machine.write_u8(0x1001, 0xab).unwrap();
        assert_eq!(machine.read_data_word(0), 0x0000ab00);
        assert!(machine.write_u8(0x2000, 0).is_err());
    }

    #[test]
    fn test_breakpoint_bookkeeping() {
        log::log_init(log::Level::Off);
        let mut machine = Machine::new();
        machine.set_breakpoint(8).unwrap();
        assert!(matches!(machine.set_breakpoint(8), Err(Error::RepeatedBreakpoint(8))));
        machine.rm_breakpoint(8).unwrap();
        assert!(matches!(machine.rm_breakpoint(8), Err(Error::BreakpointNotFound(8))));
    }
}
