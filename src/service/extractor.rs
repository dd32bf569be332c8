use roxmltree::{Document, Node};

use crate::error::DanfeError;
use crate::models::{Address, FreightPayer, Invoice, LineItem, Party, Totals, Transport};

/// Parse the raw NF-e XML and project it onto the flat invoice record.
///
/// Every field the DANFE layout reads lives at a fixed path under
/// `nfeProc > NFe > infNFe`. Each step is explicit optional access: an
/// absent element or attribute is a typed error, never a panic.
pub fn extract_invoice(xml: &str) -> Result<Invoice, DanfeError> {
    let doc = Document::parse(xml)?;

    let root = doc.root_element();
    if root.tag_name().name() != "nfeProc" {
        return Err(DanfeError::MissingElement("nfeProc"));
    }
    let inf = child(child(root, "NFe")?, "infNFe")?;

    let access_key = inf
        .attribute("Id")
        .ok_or(DanfeError::MissingAttribute("Id"))?
        .to_string();

    let issuer = extract_party(child(inf, "emit")?, "enderEmit")?;
    let recipient = extract_party(child(inf, "dest")?, "enderDest")?;

    // All det entries are kept even though typical documents carry one.
    let mut items = Vec::new();
    for det in inf.children().filter(|n| n.tag_name().name() == "det") {
        items.push(extract_item(child(det, "prod")?)?);
    }
    if items.is_empty() {
        return Err(DanfeError::MissingElement("det"));
    }

    let icms_tot = child(child(inf, "total")?, "ICMSTot")?;
    let totals = Totals {
        products: money(icms_tot, "vProd")?,
        invoice: money(icms_tot, "vNF")?,
    };

    let transp = child(inf, "transp")?;
    let transport = Transport {
        freight_payer: FreightPayer::from_code(&text(transp, "modFrete")?),
        volume_kind: text(child(transp, "vol")?, "esp")?,
    };

    let additional_info = text(child(inf, "infAdic")?, "infCpl")?;

    Ok(Invoice {
        access_key,
        issuer,
        recipient,
        items,
        totals,
        transport,
        additional_info,
    })
}

fn extract_party(node: Node<'_, '_>, address_tag: &'static str) -> Result<Party, DanfeError> {
    let ender = child(node, address_tag)?;
    Ok(Party {
        name: text(node, "xNome")?,
        cnpj: text(node, "CNPJ")?,
        state_registration: text(node, "IE")?,
        address: Address {
            street: text(ender, "xLgr")?,
            number: text(ender, "nro")?,
            complement: text(ender, "xCpl")?,
            district: text(ender, "xBairro")?,
            municipality: text(ender, "xMun")?,
            state: text(ender, "UF")?,
            postal_code: text(ender, "CEP")?,
            country: text(ender, "xPais")?,
        },
    })
}

fn extract_item(prod: Node<'_, '_>) -> Result<LineItem, DanfeError> {
    Ok(LineItem {
        code: text(prod, "cProd")?,
        description: text(prod, "xProd")?,
        quantity: text(prod, "qCom")?,
        unit: text(prod, "uCom")?,
        unit_price: money(prod, "vUnCom")?,
        total: money(prod, "vProd")?,
    })
}

/// First child element with the given local name, namespace-agnostic
fn child<'a, 'i>(node: Node<'a, 'i>, name: &'static str) -> Result<Node<'a, 'i>, DanfeError> {
    node.children()
        .find(|n| n.tag_name().name() == name)
        .ok_or(DanfeError::MissingElement(name))
}

fn text(node: Node<'_, '_>, name: &'static str) -> Result<String, DanfeError> {
    Ok(child(node, name)?.text().unwrap_or_default().trim().to_string())
}

fn money(node: Node<'_, '_>, name: &'static str) -> Result<f64, DanfeError> {
    text(node, name)?
        .parse()
        .map_err(|_| DanfeError::InvalidNumber { field: name })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe31240612345678000195550010000000011000000019" versao="4.00">
      <emit>
        <CNPJ>12345678000195</CNPJ>
        <xNome>Comercio de Ferragens Ltda</xNome>
        <enderEmit>
          <xLgr>Rua das Laranjeiras</xLgr>
          <nro>100</nro>
          <xCpl>Galpao 2</xCpl>
          <xBairro>Centro</xBairro>
          <xMun>Belo Horizonte</xMun>
          <UF>MG</UF>
          <CEP>30110010</CEP>
          <xPais>Brasil</xPais>
        </enderEmit>
        <IE>0623456789001</IE>
      </emit>
      <dest>
        <CNPJ>98765432000188</CNPJ>
        <xNome>Construtora Horizonte SA</xNome>
        <enderDest>
          <xLgr>Av. Afonso Pena</xLgr>
          <nro>2000</nro>
          <xCpl>Sala 501</xCpl>
          <xBairro>Funcionarios</xBairro>
          <xMun>Belo Horizonte</xMun>
          <UF>MG</UF>
          <CEP>30130005</CEP>
          <xPais>Brasil</xPais>
        </enderDest>
        <IE>0629876543002</IE>
      </dest>
      <det nItem="1">
        <prod>
          <cProd>FER-001</cProd>
          <xProd>Parafuso sextavado 10mm</xProd>
          <qCom>500.0000</qCom>
          <uCom>UN</uCom>
          <vUnCom>0.25</vUnCom>
          <vProd>125.00</vProd>
        </prod>
      </det>
      <total>
        <ICMSTot>
          <vProd>125.00</vProd>
          <vNF>140.5</vNF>
        </ICMSTot>
      </total>
      <transp>
        <modFrete>0</modFrete>
        <vol>
          <esp>CAIXA</esp>
        </vol>
      </transp>
      <infAdic>
        <infCpl>Mercadoria entregue no endereco do destinatario.</infCpl>
      </infAdic>
    </infNFe>
  </NFe>
</nfeProc>"#;

    #[test]
    fn extracts_the_full_record() {
        let invoice = extract_invoice(FIXTURE).unwrap();

        assert_eq!(
            invoice.access_key,
            "NFe31240612345678000195550010000000011000000019"
        );
        assert_eq!(invoice.issuer.name, "Comercio de Ferragens Ltda");
        assert_eq!(invoice.issuer.cnpj, "12345678000195");
        assert_eq!(invoice.issuer.address.street, "Rua das Laranjeiras");
        assert_eq!(invoice.issuer.address.state, "MG");
        assert_eq!(invoice.recipient.name, "Construtora Horizonte SA");
        assert_eq!(invoice.recipient.address.complement, "Sala 501");
        assert_eq!(invoice.recipient.state_registration, "0629876543002");

        assert_eq!(invoice.items.len(), 1);
        let item = &invoice.items[0];
        assert_eq!(item.code, "FER-001");
        assert_eq!(item.quantity, "500.0000");
        assert_eq!(item.unit, "UN");
        assert_eq!(item.unit_price, 0.25);
        assert_eq!(item.total, 125.00);

        assert_eq!(invoice.totals.products, 125.00);
        assert_eq!(invoice.totals.invoice, 140.5);
        assert_eq!(invoice.transport.freight_payer, FreightPayer::Issuer);
        assert_eq!(invoice.transport.volume_kind, "CAIXA");
        assert_eq!(
            invoice.additional_info,
            "Mercadoria entregue no endereco do destinatario."
        );
    }

    #[test]
    fn collects_every_det_entry() {
        let two_items = FIXTURE.replace(
            "</det>",
            r#"</det>
      <det nItem="2">
        <prod>
          <cProd>FER-002</cProd>
          <xProd>Porca sextavada 10mm</xProd>
          <qCom>500.0000</qCom>
          <uCom>UN</uCom>
          <vUnCom>0.10</vUnCom>
          <vProd>50.00</vProd>
        </prod>
      </det>"#,
        );
        let invoice = extract_invoice(&two_items).unwrap();
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[1].code, "FER-002");
    }

    #[test]
    fn truncated_xml_is_a_parse_error() {
        let truncated = &FIXTURE[..FIXTURE.len() / 2];
        assert!(matches!(
            extract_invoice(truncated),
            Err(DanfeError::InvalidXml(_))
        ));
    }

    #[test]
    fn non_xml_input_is_a_parse_error() {
        assert!(matches!(
            extract_invoice("not xml at all"),
            Err(DanfeError::InvalidXml(_))
        ));
    }

    #[test]
    fn wrong_root_element_is_reported() {
        let err = extract_invoice("<other/>").unwrap_err();
        assert!(matches!(err, DanfeError::MissingElement("nfeProc")));
    }

    #[test]
    fn missing_recipient_names_the_element() {
        let no_dest = FIXTURE.replace("<dest>", "<dst>").replace("</dest>", "</dst>");
        let err = extract_invoice(&no_dest).unwrap_err();
        assert!(matches!(err, DanfeError::MissingElement("dest")));
    }

    #[test]
    fn missing_access_key_attribute_is_reported() {
        let no_id = FIXTURE.replace(
            r#"Id="NFe31240612345678000195550010000000011000000019" "#,
            "",
        );
        let err = extract_invoice(&no_id).unwrap_err();
        assert!(matches!(err, DanfeError::MissingAttribute("Id")));
    }

    #[test]
    fn unparseable_amount_is_reported() {
        let bad_total = FIXTURE.replace("<vNF>140.5</vNF>", "<vNF>abc</vNF>");
        let err = extract_invoice(&bad_total).unwrap_err();
        assert!(matches!(err, DanfeError::InvalidNumber { field: "vNF" }));
    }

    #[test]
    fn document_without_items_is_rejected() {
        let start = FIXTURE.find("<det").unwrap();
        let end = FIXTURE.find("</det>").unwrap() + "</det>".len();
        let no_det = format!("{}{}", &FIXTURE[..start], &FIXTURE[end..]);
        let err = extract_invoice(&no_det).unwrap_err();
        assert!(matches!(err, DanfeError::MissingElement("det")));
    }
}
