// Licensed under the Apache-2.0 license

//! A PCI-flavoured demonstration namespace.
//!
//! ```text
//! /pci                      bound to a simulated config space, bookmark $pci
//! /pci/bus                  constant
//! /pci/dev[0..2]/%...       raw config registers
//! /pci/dev[0..2]/...        typed fields over them
//! /gpu                      alias of /pci/dev[0]
//! ```

use registers_namespace::{
    AliasMode, BitmaskDatatype, BoolDatatype, DirentId, EnumDatatype, FixedDatatype, HexDatatype,
    IntDatatype, MultiDatatype, Namespace, NamespaceBuilder, NamespaceError, PathError, Procedures,
    Result, SimBinding, StringDatatype, TransformDatatype, Value,
};
use std::rc::Rc;

/// Stride between device config spaces.
const DEVICE_STRIDE: u32 = 0x100;

/// Raw register contents per device: (offset, value).
const DEVICES: [&[(u32, u64)]; 2] = [
    &[
        (0x00, 0x8086),
        (0x02, 0x56a0),
        (0x04, 0x0006),
        (0x06, 0x0010),
        (0x08, 0x0300_0004),
        (0x0d, 0x40),
        (0x10, 0xf000_000c),
        (0x14, 0x0000_0040),
        (0x20, 0x0190),
        (0x22, 0x02d8),
        (0x30, 0x3055_5047),
    ],
    &[
        (0x00, 0x10ec),
        (0x02, 0x8168),
        (0x04, 0x0003),
        (0x06, 0x0000),
        (0x08, 0x0200_0015),
        (0x0d, 0x00),
        (0x20, 0x0032),
        (0x22, 0x0200),
        (0x30, 0x0043_494e),
    ],
];

fn sibling(ns: &Namespace, scope: DirentId, name: &str) -> Result<DirentId> {
    ns.lookup_str(scope, name, AliasMode::Follow)?
        .ok_or_else(|| NamespaceError::from(PathError::NotFound(name.to_string())))
}

/// `%device_id:%vendor_id` as one 32-bit value.
fn id_pair() -> Procedures {
    Procedures::new(
        |ns, scope| {
            let vendor = ns.read(sibling(ns, scope, "%vendor_id")?)?;
            let device = ns.read(sibling(ns, scope, "%device_id")?)?;
            Ok((device << 16) | vendor)
        },
        |ns, scope, value| {
            let vendor = value & &Value::mask(16);
            ns.write(sibling(ns, scope, "%vendor_id")?, &vendor)?;
            ns.write(sibling(ns, scope, "%device_id")?, &(value >> 16))
        },
    )
}

fn define_datatypes(b: &mut NamespaceBuilder) -> Result<()> {
    b.define_datatype("hex16", HexDatatype::new(16))?;
    b.define_datatype("on_off", BoolDatatype::on_off())?;
    b.define_datatype("yes_no", BoolDatatype::yes_no())?;
    b.define_datatype("count", IntDatatype::new())?;
    b.define_datatype(
        "status",
        BitmaskDatatype::new()
            .bit("intx", 3)
            .bit("caps", 4)
            .bit("mhz66", 5)
            .bit("fast_b2b", 7)
            .bit("master_abort", 13)
            .bit("parity_error", 15),
    )?;
    b.define_datatype(
        "class",
        EnumDatatype::new()
            .value("unclassified", 0)
            .value("storage", 1)
            .value("network", 2)
            .value("display", 3)
            .value("bridge", 6)
            .with_unknown("other"),
    )?;

    let none = Rc::new(EnumDatatype::new().value("none", 0).into());
    let max = Rc::new(EnumDatatype::new().value("max", 0xff).into());
    let clocks = Rc::new(IntDatatype::with_units("clocks").into());
    let latency = MultiDatatype::new()
        .range(none, 0, 0)?
        .range(clocks, 1, 0xfe)?
        .range(max, 0xff, 0xff)?;
    b.define_datatype("latency", latency)?;

    let hex64 = Rc::new(HexDatatype::new(64).into());
    b.define_datatype(
        "bar",
        TransformDatatype::new(hex64, |raw| raw << 4, |addr| addr >> 4),
    )?;
    let milliwatts = Rc::new(IntDatatype::with_units("mW").into());
    b.define_datatype(
        "power",
        TransformDatatype::new(
            milliwatts,
            |raw| raw * &Value::from(4),
            |mw| mw / &Value::from(4),
        ),
    )?;
    b.define_datatype("celsius", FixedDatatype::with_units(4, "C"))?;
    b.define_datatype("label", StringDatatype::new())?;
    Ok(())
}

fn device(b: &mut NamespaceBuilder, index: u32) -> Result<()> {
    let base = index * DEVICE_STRIDE;
    b.open_scope("dev[]")?;
    for (name, offset, width) in [
        ("%vendor_id", 0x00, 16),
        ("%device_id", 0x02, 16),
        ("%command", 0x04, 16),
        ("%status", 0x06, 16),
        ("%class", 0x08, 32),
        ("%latency", 0x0d, 8),
        ("%bar0", 0x10, 32),
        ("%bar0_hi", 0x14, 32),
        ("%power", 0x20, 16),
        ("%temp", 0x22, 16),
        ("%label", 0x30, 32),
    ] {
        b.reg(name, base + offset, width)?;
    }
    b.proc_reg("%ids", 32, id_pair())?;

    let fields = [
        ("vendor", "hex16", "%vendor_id", 15, 0),
        ("device", "hex16", "%device_id", 15, 0),
        ("io_enable", "on_off", "%command", 0, 0),
        ("mem_enable", "on_off", "%command", 1, 1),
        ("bus_master", "yes_no", "%command", 2, 2),
        ("status", "status", "%status", 15, 0),
        ("class", "class", "%class", 31, 24),
        ("revision", "count", "%class", 7, 0),
        ("latency", "latency", "%latency", 7, 0),
        ("power", "power", "%power", 15, 0),
        ("temperature", "celsius", "%temp", 15, 0),
        ("label", "label", "%label", 31, 0),
    ];
    for (name, datatype, register, hi, lo) in fields {
        let datatype = b.datatype(datatype)?;
        let bits = b.bits(register, hi, lo)?;
        b.field(name, datatype, bits)?;
    }

    // 60-bit base address split across both BAR registers.
    let bar = b.bits("%bar0_hi", 31, 0)? + b.bits("%bar0", 31, 4)?;
    let datatype = b.datatype("bar")?;
    b.field("bar0", datatype, bar)?;

    let count = b.datatype("count")?;
    b.constant_field("slot", count, index)?;
    b.alias("host", "$pci/dev[0]")?;
    b.close_scope()?;
    Ok(())
}

/// Build the demo namespace; unwritten addresses read as `fill` bytes.
pub fn build(fill: u8) -> Result<Namespace> {
    let sim = Rc::new(SimBinding::new("pci").with_fill(fill));
    for (index, regs) in (0u32..).zip(DEVICES) {
        for &(offset, value) in regs {
            sim.poke(index * DEVICE_STRIDE + offset, value);
        }
    }

    let mut b = NamespaceBuilder::new();
    b.open_bound_scope("pci", sim)?;
    b.bookmark("pci")?;
    define_datatypes(&mut b)?;
    let count = b.datatype("count")?;
    b.constant_field("bus", count, 0)?;
    for index in 0..DEVICES.len() as u32 {
        device(&mut b, index)?;
    }
    b.close_scope()?;
    b.alias("gpu", "pci/dev[0]")?;
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(ns: &Namespace, path: &str) -> String {
        let id = ns
            .lookup_str(ns.root(), path, AliasMode::Follow)
            .unwrap()
            .unwrap();
        ns.evaluate(id).unwrap()
    }

    #[test]
    fn test_rendering() {
        let ns = build(0).unwrap();
        assert_eq!(eval(&ns, "gpu/vendor"), "0x8086");
        assert_eq!(eval(&ns, "gpu/class"), "display");
        assert_eq!(eval(&ns, "pci/dev[1]/class"), "network");
        assert_eq!(eval(&ns, "gpu/revision"), "4");
        assert_eq!(eval(&ns, "gpu/status"), "caps");
        assert_eq!(eval(&ns, "gpu/io_enable"), "off");
        assert_eq!(eval(&ns, "gpu/mem_enable"), "on");
        assert_eq!(eval(&ns, "gpu/latency"), "64 clocks");
        assert_eq!(eval(&ns, "pci/dev[1]/latency"), "none");
        assert_eq!(eval(&ns, "gpu/bar0"), "0x00000040f0000000");
        assert_eq!(eval(&ns, "gpu/power"), "1600 mW");
        assert_eq!(eval(&ns, "gpu/temperature"), "45.5 C");
        assert_eq!(eval(&ns, "pci/dev[1]/temperature"), "32.0 C");
        assert_eq!(eval(&ns, "gpu/label"), "GPU0");
        assert_eq!(eval(&ns, "pci/dev[1]/label"), "NIC");
        assert_eq!(eval(&ns, "pci/dev[1]/slot"), "1");
        assert_eq!(eval(&ns, "pci/dev[1]/%ids"), "0x816810ec");
        assert_eq!(eval(&ns, "pci/dev[1]/host/device"), "0x56a0");
    }

    #[test]
    fn test_proc_register_write() {
        let ns = build(0).unwrap();
        let ids = ns
            .lookup_str(ns.root(), "gpu/%ids", AliasMode::Follow)
            .unwrap()
            .unwrap();
        ns.write_str(ids, "0x12341af4").unwrap();
        assert_eq!(eval(&ns, "gpu/vendor"), "0x1af4");
        assert_eq!(eval(&ns, "gpu/device"), "0x1234");
    }

    #[test]
    fn test_bar_write_keeps_flag_bits() {
        let ns = build(0).unwrap();
        let bar = ns
            .lookup_str(ns.root(), "gpu/bar0", AliasMode::Follow)
            .unwrap()
            .unwrap();
        ns.write_str(bar, "0x0000001fe0000000").unwrap();
        assert_eq!(eval(&ns, "gpu/%bar0"), "0xe000000c");
        assert_eq!(eval(&ns, "gpu/%bar0_hi"), "0x0000001f");
    }
}
