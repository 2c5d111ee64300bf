// Adresses dérivées de l'identité d'un routeur ou de son IP primaire.
//
// Grounded on the original `Manipulacao` static methods (extrair_subnet_roteador*,
// extrair_ip_roteadores*): every router `roteadorN` lives on `172.21.<N-1>.0/24`,
// with `.1` as the gateway and `.2` as the router's own interface address.

use std::net::Ipv4Addr;

use crate::error::{AppError, Result};

const ROUTED_PREFIX: &str = "roteador";

/// Parses the numeric suffix out of an identifier like `roteador3` (N >= 1).
pub fn parse_router_index(identifier: &str) -> Result<u32> {
    let suffix = identifier.strip_prefix(ROUTED_PREFIX).ok_or_else(|| {
        AppError::BadAddress(format!("identifier {identifier:?} is not of the form roteador<N>"))
    })?;
    let n: u32 = suffix
        .parse()
        .map_err(|_| AppError::BadAddress(format!("identifier {identifier:?} has a non-numeric suffix")))?;
    if n == 0 {
        return Err(AppError::BadAddress(format!("identifier {identifier:?} must have N >= 1")));
    }
    Ok(n)
}

/// The subnet index `N-1` for a given router identifier.
pub fn subnet_index(identifier: &str) -> Result<u32> {
    Ok(parse_router_index(identifier)? - 1)
}

/// The `/24` subnet `172.21.<N-1>.0/24`, returned as (network address, prefix length).
pub fn subnet_for_identifier(identifier: &str) -> Result<(Ipv4Addr, u8)> {
    let idx = subnet_index(identifier)?;
    Ok((subnet_octet(idx), 24))
}

/// The gateway address `172.21.<N-1>.1`.
pub fn gateway_for_identifier(identifier: &str) -> Result<Ipv4Addr> {
    let idx = subnet_index(identifier)?;
    Ok(host_in_subnet(idx, 1))
}

/// The router's own interface address `172.21.<N-1>.2`.
pub fn router_interface_for_identifier(identifier: &str) -> Result<Ipv4Addr> {
    let idx = subnet_index(identifier)?;
    Ok(host_in_subnet(idx, 2))
}

/// Given any IPv4 address `a.b.c.d` on a routed `/24`, returns `a.b.c.0/24`.
pub fn subnet_for_ip(ip: Ipv4Addr) -> Result<(Ipv4Addr, u8)> {
    let octets = ip.octets();
    Ok((Ipv4Addr::new(octets[0], octets[1], octets[2], 0), 24))
}

/// Given any IPv4 address `a.b.c.d` on a routed `/24`, returns the router's interface
/// address `a.b.c.2` on that subnet.
pub fn router_interface_for_ip(ip: Ipv4Addr) -> Ipv4Addr {
    let octets = ip.octets();
    Ipv4Addr::new(octets[0], octets[1], octets[2], 2)
}

fn subnet_octet(idx: u32) -> Ipv4Addr {
    host_in_subnet(idx, 0)
}

fn host_in_subnet(idx: u32, host: u8) -> Ipv4Addr {
    // idx is the third octet; this mirrors 172.21.<idx>.<host>.
    let third = (idx % 256) as u8;
    Ipv4Addr::new(172, 21, third, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_identifiers() {
        assert_eq!(parse_router_index("roteador1").unwrap(), 1);
        assert_eq!(parse_router_index("roteador42").unwrap(), 42);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(parse_router_index("router1").is_err());
        assert!(parse_router_index("roteador0").is_err());
        assert!(parse_router_index("roteador").is_err());
        assert!(parse_router_index("roteadorx").is_err());
    }

    #[test]
    fn derives_subnet_gateway_and_interface() {
        let (net, prefix) = subnet_for_identifier("roteador3").unwrap();
        assert_eq!(net, Ipv4Addr::new(172, 21, 2, 0));
        assert_eq!(prefix, 24);
        assert_eq!(gateway_for_identifier("roteador3").unwrap(), Ipv4Addr::new(172, 21, 2, 1));
        assert_eq!(
            router_interface_for_identifier("roteador3").unwrap(),
            Ipv4Addr::new(172, 21, 2, 2)
        );
    }

    #[test]
    fn derives_from_ip_symmetrically() {
        let ip: Ipv4Addr = "172.21.2.2".parse().unwrap();
        let (net, prefix) = subnet_for_ip(ip).unwrap();
        assert_eq!(net, Ipv4Addr::new(172, 21, 2, 0));
        assert_eq!(prefix, 24);
        assert_eq!(router_interface_for_ip(ip), Ipv4Addr::new(172, 21, 2, 2));
    }

    #[test]
    fn identifier_and_ip_derivations_agree() {
        for n in 1..=10u32 {
            let id = format!("roteador{n}");
            let iface = router_interface_for_identifier(&id).unwrap();
            assert_eq!(router_interface_for_ip(iface), iface);
        }
    }
}
