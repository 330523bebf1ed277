//! Per-PF VF counters from the kernel's rtnetlink interface.
//!
//! The selector only sees the `VfStatsSource` trait; a failed query degrades
//! to an empty record set and is never surfaced to the caller.

use crate::error::NetlinkResult;
use crate::model::PerPf;
use tracing::warn;

/// Supplies the structured VF records of one PF.
pub trait VfStatsSource {
    fn vf_stats(&self, pf: &str) -> PerPf;
}

/// Queries the running kernel with `RTM_GETLINK`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetlinkSource;

impl NetlinkSource {
    pub fn new() -> Self {
        Self
    }
}

impl VfStatsSource for NetlinkSource {
    fn vf_stats(&self, pf: &str) -> PerPf {
        match query(pf) {
            Ok(data) => data,
            Err(e) => {
                warn!(pf, error = %e, "netlink VF query failed");
                PerPf::empty(pf)
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn query(pf: &str) -> NetlinkResult<PerPf> {
    linux::query(pf)
}

#[cfg(not(target_os = "linux"))]
fn query(_pf: &str) -> NetlinkResult<PerPf> {
    Err(crate::error::NetlinkError::Unsupported)
}

#[cfg(target_os = "linux")]
mod linux {
    use crate::error::{NetlinkError, NetlinkResult};
    use crate::model::{PerPf, VfCounters};
    use netlink_packet_core::{NLM_F_REQUEST, NetlinkHeader, NetlinkMessage, NetlinkPayload};
    use netlink_packet_route::RouteNetlinkMessage;
    use netlink_packet_route::link::{
        LinkAttribute, LinkExtentMask, LinkMessage, VfInfo, VfStats,
    };
    use netlink_sys::{Socket, SocketAddr, protocols::NETLINK_ROUTE};
    use tracing::{debug, trace};

    /// Fetch the VF list of `pf`. The request carries `RTEXT_FILTER_VF`,
    /// without it the kernel omits `IFLA_VFINFO_LIST`.
    pub(super) fn query(pf: &str) -> NetlinkResult<PerPf> {
        let mut socket = Socket::new(NETLINK_ROUTE)?;
        socket.bind_auto()?;
        socket.connect(&SocketAddr::new(0, 0))?;

        let mut header = NetlinkHeader::default();
        header.flags = NLM_F_REQUEST;
        header.sequence_number = 1;

        let mut link = LinkMessage::default();
        link.attributes.push(LinkAttribute::IfName(pf.to_string()));
        link.attributes
            .push(LinkAttribute::ExtMask(vec![LinkExtentMask::Vf]));

        let mut packet = NetlinkMessage::new(
            header,
            NetlinkPayload::InnerMessage(RouteNetlinkMessage::GetLink(link)),
        );
        packet.finalize();

        let mut buf = vec![0u8; packet.buffer_len()];
        packet.serialize(&mut buf);
        socket.send(&buf, 0)?;
        debug!(pf, "requested link with VF info");

        loop {
            // Sized to the pending datagram; PFs with many VFs exceed a page.
            let (reply, _) = socket.recv_from_full()?;
            if reply.is_empty() {
                return Err(NetlinkError::NoLink(pf.to_string()));
            }

            let mut offset = 0;
            while offset < reply.len() {
                let msg = NetlinkMessage::<RouteNetlinkMessage>::deserialize(&reply[offset..])
                    .map_err(|e| NetlinkError::Parse(e.to_string()))?;
                let len = msg.header.length as usize;

                match msg.payload {
                    NetlinkPayload::InnerMessage(RouteNetlinkMessage::NewLink(link)) => {
                        let data = per_pf_from_link(pf, &link);
                        trace!(pf, vfs = data.vfs.len(), "parsed VF info list");
                        return Ok(data);
                    }
                    NetlinkPayload::Error(err) => {
                        if let Some(code) = err.code {
                            return Err(NetlinkError::Kernel {
                                pf: pf.to_string(),
                                code: code.get(),
                            });
                        }
                    }
                    NetlinkPayload::Done(_) => {
                        return Err(NetlinkError::NoLink(pf.to_string()));
                    }
                    _ => {}
                }

                if len == 0 {
                    break;
                }
                // Align to 4 bytes (netlink alignment requirement)
                offset += (len + 3) & !3;
            }
        }
    }

    /// VF records in the order the kernel lists them, which is VF index order.
    fn per_pf_from_link(pf: &str, link: &LinkMessage) -> PerPf {
        let mut vfs = Vec::new();
        for attr in &link.attributes {
            if let LinkAttribute::VfInfoList(list) = attr {
                vfs.extend(list.iter().map(|vf| counters_from_vf_info(&vf.0)));
            }
        }
        PerPf {
            pf: pf.to_string(),
            vfs,
        }
    }

    fn counters_from_vf_info(infos: &[VfInfo]) -> VfCounters {
        let mut counters = VfCounters::default();
        for info in infos {
            let VfInfo::Stats(stats) = info else {
                continue;
            };
            for stat in stats {
                match *stat {
                    VfStats::RxPackets(v) => counters.rx_packets = v,
                    VfStats::TxPackets(v) => counters.tx_packets = v,
                    VfStats::RxBytes(v) => counters.rx_bytes = v,
                    VfStats::TxBytes(v) => counters.tx_bytes = v,
                    VfStats::Broadcast(v) => counters.broadcast = v,
                    VfStats::Multicast(v) => counters.multicast = v,
                    VfStats::RxDropped(v) => counters.rx_dropped = v,
                    VfStats::TxDropped(v) => counters.tx_dropped = v,
                    _ => {}
                }
            }
        }
        counters
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pf_degrades_to_empty_data() {
        // Either the kernel rejects the name or netlink is unavailable;
        // both must come back as an empty record set.
        let data = NetlinkSource::new().vf_stats("no-such-pf-0xdead");
        assert_eq!(data, PerPf::empty("no-such-pf-0xdead"));
    }
}
