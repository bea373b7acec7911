//! Dataplane error catalog
//!
//! Maps the negative `retval` codes returned by the dataplane's synchronous call
//! convention to a symbolic name and human readable text. The table follows
//! `vnet/api_errno.h`.

use std::fmt;
use thiserror::Error;

/// One known dataplane status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorEntry {
    pub name: &'static str,
    pub code: i32,
    pub text: &'static str,
}

impl ErrorEntry {
    const fn new(name: &'static str, code: i32, text: &'static str) -> Self {
        Self { name, code, text }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.text, self.name, self.code)
    }
}

/// The catalog has no entry for a code the dataplane returned.
///
/// This means the table is stale relative to the dataplane build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown dataplane error code {0}; the error catalog is out of date")]
pub struct UnknownErrorCode(pub i32);

/// Look up a status code
pub fn lookup(code: i32) -> Result<&'static ErrorEntry, UnknownErrorCode> {
    ERRORS
        .iter()
        .find(|entry| entry.code == code)
        .ok_or(UnknownErrorCode(code))
}

/// All known entries, in code order
pub fn entries() -> &'static [ErrorEntry] {
    ERRORS
}

static ERRORS: &[ErrorEntry] = &[
    ErrorEntry::new("UNSPECIFIED", -1, "Unspecified Error"),
    ErrorEntry::new("INVALID_SW_IF_INDEX", -2, "Invalid sw_if_index"),
    ErrorEntry::new("NO_SUCH_FIB", -3, "No such FIB / VRF"),
    ErrorEntry::new("NO_SUCH_INNER_FIB", -4, "No such inner FIB / VRF"),
    ErrorEntry::new("NO_SUCH_LABEL", -5, "No such label"),
    ErrorEntry::new("NO_SUCH_ENTRY", -6, "No such entry"),
    ErrorEntry::new("INVALID_VALUE", -7, "Invalid value"),
    ErrorEntry::new("INVALID_VALUE_2", -8, "Invalid value #2"),
    ErrorEntry::new("UNIMPLEMENTED", -9, "Unimplemented"),
    ErrorEntry::new("INVALID_SW_IF_INDEX_2", -10, "Invalid sw_if_index #2"),
    ErrorEntry::new("SYSCALL_ERROR_1", -11, "System call error #1"),
    ErrorEntry::new("SYSCALL_ERROR_2", -12, "System call error #2"),
    ErrorEntry::new("SYSCALL_ERROR_3", -13, "System call error #3"),
    ErrorEntry::new("SYSCALL_ERROR_4", -14, "System call error #4"),
    ErrorEntry::new("SYSCALL_ERROR_5", -15, "System call error #5"),
    ErrorEntry::new("SYSCALL_ERROR_6", -16, "System call error #6"),
    ErrorEntry::new("SYSCALL_ERROR_7", -17, "System call error #7"),
    ErrorEntry::new("SYSCALL_ERROR_8", -18, "System call error #8"),
    ErrorEntry::new("SYSCALL_ERROR_9", -19, "System call error #9"),
    ErrorEntry::new("SYSCALL_ERROR_10", -20, "System call error #10"),
    ErrorEntry::new("FEATURE_DISABLED", -30, "Feature disabled by configuration"),
    ErrorEntry::new("INVALID_REGISTRATION", -31, "Invalid registration"),
    ErrorEntry::new("NEXT_HOP_NOT_IN_FIB", -50, "Next hop not in FIB"),
    ErrorEntry::new("UNKNOWN_DESTINATION", -51, "Unknown destination"),
    ErrorEntry::new("NO_PATHS_IN_ROUTE", -52, "No paths specified in route"),
    ErrorEntry::new("NEXT_HOP_NOT_FOUND_MP", -53, "Next hop not found multipath"),
    ErrorEntry::new("NO_MATCHING_INTERFACE", -54, "No matching interface for probe"),
    ErrorEntry::new("INVALID_VLAN", -55, "Invalid VLAN"),
    ErrorEntry::new("VLAN_ALREADY_EXISTS", -56, "VLAN subif already exists"),
    ErrorEntry::new("INVALID_SRC_ADDRESS", -57, "Invalid src address"),
    ErrorEntry::new("INVALID_DST_ADDRESS", -58, "Invalid dst address"),
    ErrorEntry::new("ADDRESS_LENGTH_MISMATCH", -59, "Address length mismatch"),
    ErrorEntry::new("ADDRESS_NOT_FOUND_FOR_INTERFACE", -60, "Address not found for interface"),
    ErrorEntry::new("ADDRESS_NOT_DELETABLE", -61, "Address not deletable"),
    ErrorEntry::new("IP6_NOT_ENABLED", -62, "ip6 not enabled"),
    ErrorEntry::new("NO_SUCH_NODE", -63, "No such graph node"),
    ErrorEntry::new("NO_SUCH_NODE2", -64, "No such graph node #2"),
    ErrorEntry::new("NO_SUCH_TABLE", -65, "No such table"),
    ErrorEntry::new("NO_SUCH_TABLE2", -66, "No such table #2"),
    ErrorEntry::new("NO_SUCH_TABLE3", -67, "No such table #3"),
    ErrorEntry::new("SUBIF_ALREADY_EXISTS", -68, "Subinterface already exists"),
    ErrorEntry::new("SUBIF_CREATE_FAILED", -69, "Subinterface creation failed"),
    ErrorEntry::new("INVALID_MEMORY_SIZE", -70, "Invalid memory size requested"),
    ErrorEntry::new("INVALID_INTERFACE", -71, "Invalid interface"),
    ErrorEntry::new("INVALID_VLAN_TAG_COUNT", -72, "Invalid number of tags for requested operation"),
    ErrorEntry::new("INVALID_ARGUMENT", -73, "Invalid argument"),
    ErrorEntry::new("UNEXPECTED_INTF_STATE", -74, "Unexpected interface state"),
    ErrorEntry::new("TUNNEL_EXIST", -75, "Tunnel already exists"),
    ErrorEntry::new("INVALID_DECAP_NEXT", -76, "Invalid decap-next"),
    ErrorEntry::new("RESPONSE_NOT_READY", -77, "Response not ready"),
    ErrorEntry::new("NOT_CONNECTED", -78, "Not connected to the data plane"),
    ErrorEntry::new("IF_ALREADY_EXISTS", -79, "Interface already exists"),
    ErrorEntry::new("BOND_SLAVE_NOT_ALLOWED", -80, "Operation not allowed on slave of BondEthernet"),
    ErrorEntry::new("VALUE_EXIST", -81, "Value already exists"),
    ErrorEntry::new("SAME_SRC_DST", -82, "Source and destination are the same"),
    ErrorEntry::new("IP6_MULTICAST_ADDRESS_NOT_PRESENT", -83, "IP6 multicast address required"),
    ErrorEntry::new("SR_POLICY_NAME_NOT_PRESENT", -84, "Segment routing policy name required"),
    ErrorEntry::new("NOT_RUNNING_AS_ROOT", -85, "Not running as root"),
    ErrorEntry::new("ALREADY_CONNECTED", -86, "Connection to the data plane already exists"),
    ErrorEntry::new("UNSUPPORTED_JNI_VERSION", -87, "Unsupported JNI version"),
    ErrorEntry::new("IP_PREFIX_INVALID", -88, "IP prefix invalid (masked bits set in address)"),
    ErrorEntry::new("INVALID_WORKER", -89, "Invalid worker thread"),
    ErrorEntry::new("LISP_DISABLED", -90, "LISP is disabled"),
    ErrorEntry::new("CLASSIFY_TABLE_NOT_FOUND", -91, "Classify table not found"),
    ErrorEntry::new("INVALID_EID_TYPE", -92, "Unsupported LISP EID type"),
    ErrorEntry::new("CANNOT_CREATE_PCAP_FILE", -93, "Cannot create pcap file"),
    ErrorEntry::new("INCORRECT_ADJACENCY_TYPE", -94, "Invalid adjacency type for this operation"),
    ErrorEntry::new("EXCEEDED_NUMBER_OF_RANGES_CAPACITY", -95, "Operation would exceed configured capacity of ranges"),
    ErrorEntry::new("EXCEEDED_NUMBER_OF_PORTS_CAPACITY", -96, "Operation would exceed capacity of number of ports"),
    ErrorEntry::new("INVALID_ADDRESS_FAMILY", -97, "Invalid address family"),
    ErrorEntry::new("INVALID_SUB_SW_IF_INDEX", -98, "Invalid sub-interface sw_if_index"),
    ErrorEntry::new("TABLE_TOO_BIG", -99, "Table too big"),
    ErrorEntry::new("CANNOT_ENABLE_DISABLE_FEATURE", -100, "Cannot enable/disable feature"),
    ErrorEntry::new("BFD_EEXIST", -101, "Duplicate BFD object"),
    ErrorEntry::new("BFD_ENOENT", -102, "No such BFD object"),
    ErrorEntry::new("BFD_EINUSE", -103, "BFD object in use"),
    ErrorEntry::new("BFD_NOTSUPP", -104, "BFD feature not supported"),
    ErrorEntry::new("ADDRESS_IN_USE", -105, "Address in use"),
    ErrorEntry::new("ADDRESS_NOT_IN_USE", -106, "Address not in use"),
    ErrorEntry::new("QUEUE_FULL", -107, "Queue full"),
    ErrorEntry::new("APP_UNSUPPORTED_CFG", -108, "Unsupported application config"),
    ErrorEntry::new("URI_FIFO_CREATE_FAILED", -109, "URI FIFO segment create failed"),
    ErrorEntry::new("LISP_RLOC_LOCAL", -110, "RLOC address is local"),
    ErrorEntry::new("BFD_EAGAIN", -111, "BFD object cannot be manipulated at this time"),
    ErrorEntry::new("INVALID_GPE_MODE", -112, "Invalid GPE mode"),
    ErrorEntry::new("LISP_GPE_ENTRIES_PRESENT", -113, "LISP GPE entries are present"),
    ErrorEntry::new("ADDRESS_FOUND_FOR_INTERFACE", -114, "Address found for interface"),
    ErrorEntry::new("SESSION_CONNECT", -115, "Session failed to connect"),
    ErrorEntry::new("ENTRY_ALREADY_EXISTS", -116, "Entry already exists"),
    ErrorEntry::new("SVM_SEGMENT_CREATE_FAIL", -117, "Svm segment create fail"),
    ErrorEntry::new("APPLICATION_NOT_ATTACHED", -118, "Application not attached"),
    ErrorEntry::new("BD_ALREADY_EXISTS", -119, "Bridge domain already exists"),
    ErrorEntry::new("BD_IN_USE", -120, "Bridge domain has member interfaces"),
    ErrorEntry::new("BD_NOT_MODIFIABLE", -121, "Bridge domain 0 can't be deleted/modified"),
    ErrorEntry::new("BD_ID_EXCEED_MAX", -122, "Bridge domain ID exceeds 16M limit"),
    ErrorEntry::new("SUBIF_DOESNT_EXIST", -123, "Subinterface doesn't exist"),
    ErrorEntry::new("L2_MACS_EVENT_CLINET_PRESENT", -124, "Client already exist for L2 MACs events"),
    ErrorEntry::new("INVALID_QUEUE", -125, "Invalid queue"),
    ErrorEntry::new("UNSUPPORTED", -126, "Unsupported"),
    ErrorEntry::new("DUPLICATE_IF_ADDRESS", -127, "Address already present on another interface"),
    ErrorEntry::new("APP_INVALID_NS", -128, "Invalid application namespace"),
    ErrorEntry::new("APP_WRONG_NS_SECRET", -129, "Wrong app namespace secret"),
    ErrorEntry::new("APP_CONNECT_SCOPE", -130, "Connect scope"),
    ErrorEntry::new("APP_ALREADY_ATTACHED", -131, "App already attached"),
    ErrorEntry::new("SESSION_REDIRECT", -132, "Redirect failed"),
    ErrorEntry::new("ILLEGAL_NAME", -133, "Illegal name"),
    ErrorEntry::new("NO_NAME_SERVERS", -134, "No name servers configured"),
    ErrorEntry::new("NAME_SERVER_NOT_FOUND", -135, "Name server not found"),
    ErrorEntry::new("NAME_RESOLUTION_NOT_ENABLED", -136, "Name resolution not enabled"),
    ErrorEntry::new("NAME_SERVER_FORMAT_ERROR", -137, "Server format error (bug!)"),
    ErrorEntry::new("NAME_SERVER_NO_SUCH_NAME", -138, "No such name"),
    ErrorEntry::new("NAME_SERVER_NO_ADDRESSES", -139, "No addresses available"),
    ErrorEntry::new("NAME_SERVER_NEXT_SERVER", -140, "Retry with new server"),
    ErrorEntry::new("APP_CONNECT_FILTERED", -141, "Connect was filtered"),
    ErrorEntry::new("ACL_IN_USE_INBOUND", -142, "Inbound ACL in use"),
    ErrorEntry::new("ACL_IN_USE_OUTBOUND", -143, "Outbound ACL in use"),
    ErrorEntry::new("INIT_FAILED", -144, "Initialization Failed"),
    ErrorEntry::new("NETLINK_ERROR", -145, "Netlink error"),
    ErrorEntry::new("BIER_BSL_UNSUP", -146, "BIER bit-string-length unsupported"),
    ErrorEntry::new("INSTANCE_IN_USE", -147, "Instance in use"),
    ErrorEntry::new("INVALID_SESSION_ID", -148, "Session ID out of range"),
    ErrorEntry::new("ACL_IN_USE_BY_LOOKUP_CONTEXT", -149, "ACL in use by a lookup context"),
    ErrorEntry::new("INVALID_VALUE_3", -150, "Invalid value #3"),
    ErrorEntry::new("NON_ETHERNET", -151, "Interface is not an Ethernet interface"),
    ErrorEntry::new("BD_ALREADY_HAS_BVI", -152, "Bridge domain already has a BVI interface"),
    ErrorEntry::new("INVALID_PROTOCOL", -153, "Invalid Protocol"),
    ErrorEntry::new("INVALID_ALGORITHM", -154, "Invalid Algorithm"),
    ErrorEntry::new("RSRC_IN_USE", -155, "Resource In Use"),
    ErrorEntry::new("KEY_LENGTH", -156, "invalid Key Length"),
    ErrorEntry::new("FIB_PATH_UNSUPPORTED_NH_PROTO", -157, "Unsupported FIB Path protocol"),
    ErrorEntry::new("API_ENDIAN_FAILED", -159, "Endian mismatch detected"),
    ErrorEntry::new("NO_CHANGE", -160, "No change in table"),
    ErrorEntry::new("MISSING_CERT_KEY", -161, "Missing certifcate or key"),
    ErrorEntry::new("LIMIT_EXCEEDED", -162, "limit exceeded"),
    ErrorEntry::new("IKE_NO_PORT", -163, "port not managed by IKE"),
    ErrorEntry::new("UDP_PORT_TAKEN", -164, "UDP port already taken"),
    ErrorEntry::new("EAGAIN", -165, "Retry stream call with cursor"),
    ErrorEntry::new("INVALID_VALUE_4", -166, "Invalid value #4"),
];
