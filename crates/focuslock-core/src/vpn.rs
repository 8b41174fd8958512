//! Built-in VPN block lists, applied when `block_common_vpn` is on

/// Process names of common consumer VPN clients
pub const VPN_EXECUTABLES: &[&str] = &[
    "NordVPN.exe",
    "ExpressVPN.exe",
    "openvpn.exe",
    "wireguard.exe",
    "pia-client.exe",
    "Surfshark.exe",
    "CyberGhost.exe",
    "ProtonVPN.exe",
    "Windscribe.exe",
    "Mullvad VPN.exe",
    "HotspotShield.exe",
    "TunnelBear.exe",
    "avgvpn.exe",
    "vpndaemon.exe",
];

/// Vendor sites of the same clients
pub const VPN_DOMAINS: &[&str] = &[
    "nordvpn.com",
    "expressvpn.com",
    "openvpn.net",
    "wireguard.com",
    "privateinternetaccess.com",
    "surfshark.com",
    "cyberghostvpn.com",
    "protonvpn.com",
    "windscribe.com",
    "mullvad.net",
    "hotspotshield.com",
    "tunnelbear.com",
    "avg.com",
];
